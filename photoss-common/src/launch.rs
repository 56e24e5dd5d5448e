/// What the screensaver host asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchAction {
    /// `/c`: show the settings.
    Configure,
    /// `/s`, `/p`, or no argument.
    Slideshow,
    Exit,
}

/// Maps the first launch argument to an action.
///
/// Only the first two characters count, so `/p:1234` and `/c:5678` work.
pub fn parse_launch<I, S>(args: I) -> LaunchAction
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let Some(first) = args.into_iter().next() else {
        return LaunchAction::Slideshow;
    };

    let flag = first.as_ref().trim().to_lowercase();
    match flag.get(..2) {
        Some("/c") => LaunchAction::Configure,
        Some("/p") | Some("/s") => LaunchAction::Slideshow,
        _ => LaunchAction::Exit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_argument_starts_slideshow() {
        assert_eq!(parse_launch(Vec::<String>::new()), LaunchAction::Slideshow);
    }

    #[test]
    fn test_flags() {
        assert_eq!(parse_launch(["/c"]), LaunchAction::Configure);
        assert_eq!(parse_launch(["/s"]), LaunchAction::Slideshow);
        assert_eq!(parse_launch(["/p"]), LaunchAction::Slideshow);
    }

    #[test]
    fn test_flags_are_case_insensitive_and_trimmed() {
        assert_eq!(parse_launch(["/S"]), LaunchAction::Slideshow);
        assert_eq!(parse_launch([" /C "]), LaunchAction::Configure);
    }

    #[test]
    fn test_window_handle_suffixes() {
        assert_eq!(parse_launch(["/p:1234"]), LaunchAction::Slideshow);
        assert_eq!(parse_launch(["/c:5678"]), LaunchAction::Configure);
        assert_eq!(parse_launch(["/p", "1234"]), LaunchAction::Slideshow);
    }

    #[test]
    fn test_unknown_arguments_exit() {
        assert_eq!(parse_launch(["/x"]), LaunchAction::Exit);
        assert_eq!(parse_launch(["/"]), LaunchAction::Exit);
        assert_eq!(parse_launch([""]), LaunchAction::Exit);
        assert_eq!(parse_launch(["--help"]), LaunchAction::Exit);
    }
}
