use super::*;

fn parse(line: &str) -> Result<Command, CommandError> {
    parse_command(line).expect("not blank")
}

#[test]
fn blank_lines_are_ignored() {
    assert_eq!(parse_command(""), None);
    assert_eq!(parse_command("   \t"), None);
}

#[test]
fn parses_every_command() {
    assert_eq!(parse("list"), Ok(Command::List));
    assert_eq!(parse("add   Write tests "), Ok(Command::Add("Write tests".into())));
    assert_eq!(parse("toggle 2"), Ok(Command::Toggle(2)));
    assert_eq!(parse("done 1"), Ok(Command::Done(1)));
    assert_eq!(parse("undo 3"), Ok(Command::Undo(3)));
    assert_eq!(
        parse("rename 1 Learn  async Rust"),
        Ok(Command::Rename(1, "Learn  async Rust".into()))
    );
    assert_eq!(parse("rm 4"), Ok(Command::Remove(4)));
    assert_eq!(parse("time"), Ok(Command::Time));
    assert_eq!(parse("help"), Ok(Command::Help));
    assert_eq!(parse("  quit  "), Ok(Command::Quit));
}

#[test]
fn add_with_blank_title_is_passed_through() {
    // The controller decides what to do with blank titles.
    assert_eq!(parse("add"), Ok(Command::Add(String::new())));
}

#[test]
fn positions_are_one_based() {
    assert_eq!(parse("toggle 0"), Err(CommandError::BadIndex("0".into())));
    assert_eq!(parse("rm x"), Err(CommandError::BadIndex("x".into())));
    assert_eq!(parse("done"), Err(CommandError::MissingIndex("done")));
}

#[test]
fn rename_needs_a_title() {
    assert_eq!(parse("rename 2"), Err(CommandError::MissingTitle("rename")));
    assert_eq!(parse("rename"), Err(CommandError::MissingIndex("rename")));
}

#[test]
fn unknown_words_are_reported() {
    let err = parse("frobnicate 1").expect_err("unknown");
    assert_eq!(err, CommandError::Unknown("frobnicate".into()));
    assert!(err.to_string().contains("help"));
}
