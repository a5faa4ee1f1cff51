use checkito::*;
use clasp::{Builder, Range, Spell, StyledText};
use std::{error, result};

type Result = result::Result<(), Box<dyn error::Error>>;
const COUNT: usize = 1000;

#[test]
fn bounded_ranges_display_and_parse_back() -> Result {
    (0usize..1000, 0usize..1000).check(COUNT, |(min, extra)| {
        let (min, extra): (usize, usize) = (min.clone(), extra.clone());
        let range = Range::new(min, min + extra);
        range.to_string().parse::<Range>() == Ok(range)
    })?;
    Ok(())
}

#[test]
fn unbounded_ranges_display_and_parse_back() -> Result {
    (0usize..1000).check(COUNT, |min| {
        let min: usize = min.clone();
        let range = Range::at_least(min);
        range.to_string() == format!("{min}..*") && range.to_string().parse::<Range>() == Ok(range)
    })?;
    Ok(())
}

#[test]
fn reversed_ranges_are_rejected() -> Result {
    (1usize..1000, 1usize..1000).check(COUNT, |(max, extra)| {
        let (max, extra): (usize, usize) = (max.clone(), extra.clone());
        format!("{}..{max}", max + extra).parse::<Range>().is_err()
    })?;
    Ok(())
}

#[test]
fn appended_text_keeps_both_widths() -> Result {
    (regex!("[a-z ]{0,20}"), regex!("[a-z ]{0,20}")).check(COUNT, |(left, right)| {
        let left = StyledText::markup(left.as_str());
        let right = StyledText::markup(right.as_str());
        left.append(&right).width() == left.width() + right.width()
    })?;
    Ok(())
}

#[test]
fn markup_strips_to_plain_text() -> Result {
    regex!("[a-z]{1,12}").check(COUNT, |word| {
        let text = StyledText::markup(&format!("<@|bold,fg(red) {word}|@>"));
        text.plain() == format!("<{word}>") && text.sections().len() == 1
    })?;
    Ok(())
}

#[test]
fn a_name_is_its_own_nearest_suggestion() -> Result {
    regex!("[a-z]{2,12}").check(COUNT, |name| {
        let long = format!("--{name}");
        let names = [long.as_str(), "--zzzzzzzzzzzzzzzz"];
        Spell::new().suggest(&long, names, Spell::threshold(&long)).first() == Some(&long.as_str())
    })?;
    Ok(())
}

#[test]
fn any_single_letter_option_parses() -> Result {
    regex!("[a-zA-Z]").check(COUNT, |letter| {
        let parser = Builder::new()
            .option(|option| option.name(letter.clone()))
            .build()
            .unwrap();
        let key = letter.clone();
        let parsed = parser
            .parse_with([format!("-{letter}"), "value".to_string()])
            .unwrap();
        parsed[0].get::<String>(&key) == Some("value".to_string())
    })?;
    Ok(())
}
