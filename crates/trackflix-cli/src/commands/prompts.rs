use color_eyre::eyre::eyre;
use color_eyre::Result;
use dialoguer::{Confirm, Input, Password};

use crate::output::Output;

/// Prompt for a string value with optional default
pub fn prompt_string(prompt: &str, default: Option<&str>) -> Result<String> {
    let mut input_builder = Input::<String>::new().with_prompt(prompt).allow_empty(true);

    if let Some(default_value) = default {
        input_builder = input_builder.default(default_value.to_string());
    }

    input_builder
        .interact_text()
        .map_err(|e| eyre!("Failed to read input: {}", e))
}

/// Use `value` when given, otherwise ask until something non-empty is entered
pub fn value_or_prompt(value: Option<String>, prompt: &str) -> Result<String> {
    if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
        return Ok(value.trim().to_string());
    }
    loop {
        let entered = prompt_string(prompt, None)?;
        if !entered.trim().is_empty() {
            return Ok(entered.trim().to_string());
        }
    }
}

/// Prompt for a password (masked input)
pub fn prompt_password(prompt: &str) -> Result<String> {
    Password::new()
        .with_prompt(prompt)
        .interact()
        .map_err(|e| eyre!("Failed to read password: {}", e))
}

/// Masked password entered twice
pub fn prompt_new_password() -> Result<String> {
    Password::new()
        .with_prompt("Password")
        .with_confirmation("Confirm password", "Passwords do not match")
        .interact()
        .map_err(|e| eyre!("Failed to read password: {}", e))
}

pub fn prompt_yes_no(prompt: &str, default: bool, output: &Output) -> Result<bool> {
    Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()
        .map_err(|e| {
            output.error(format!("Failed to read confirmation: {}", e));
            eyre!("Failed to read confirmation: {}", e)
        })
}

/// Ask for a rating 1-10; an empty answer means "done" and yields `None`
pub fn prompt_rating(prompt: &str, output: &Output) -> Result<Option<u8>> {
    loop {
        let entered = Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
            .map_err(|e| eyre!("Failed to read input: {}", e))?;

        match parse_rating_input(&entered) {
            Ok(rating) => return Ok(rating),
            Err(msg) => output.error(msg),
        }
    }
}

fn parse_rating_input(input: &str) -> std::result::Result<Option<u8>, &'static str> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    match trimmed.parse::<u8>() {
        Ok(n) if (1..=10).contains(&n) => Ok(Some(n)),
        _ => Err("Invalid input. Please enter a number from 1 to 10."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rating_input() {
        assert_eq!(parse_rating_input(""), Ok(None));
        assert_eq!(parse_rating_input(" 7 "), Ok(Some(7)));
        assert_eq!(parse_rating_input("10"), Ok(Some(10)));
        assert!(parse_rating_input("0").is_err());
        assert!(parse_rating_input("11").is_err());
        assert!(parse_rating_input("seven").is_err());
    }

    #[test]
    fn test_value_or_prompt_uses_given_value() {
        let value = value_or_prompt(Some("  ana@example.com ".to_string()), "Email").unwrap();
        assert_eq!(value, "ana@example.com");
    }
}
