//! Console prompts and styled replies.

use dialoguer::{Confirm, Input};

use super::*;

pub static INFO_PREFIX: &str = "ℹ ";
pub static WORKING_PREFIX: &str = "» ";
pub static SUCCESS_PREFIX: &str = "✓ ";
pub static ERROR_PREFIX: &str = "✗ ";
pub static WARNING_PREFIX: &str = "! ";
pub static PROMPT_PREFIX: &str = "❯ ";
pub static ITEM_PREFIX: &str = "├─";
pub static LAST_ITEM_PREFIX: &str = "└─";
pub static CONTINUE_PREFIX: &str = "│  ";
pub static LAST_CONTINUE_PREFIX: &str = "   ";

/// Reply for a run that found nothing.
pub static NO_PAPERS: &str = "No papers with pharmaceutical or biotech company authors found";

/// Something to tell the user.
#[derive(Debug)]
pub enum ResponseContent<'a> {
  Papers(&'a [PaperResult]),
  Working(&'a str),
  Success(&'a str),
  Warning(&'a str),
  Error(&'a CliError),
  Info(&'a str),
}

/// How the CLI asks and tells the user things.
pub trait UserInteraction {
  /// Asks a yes/no question.
  fn confirm(&self, message: &str, default: bool) -> Result<bool>;
  /// Asks for a line of text.
  fn prompt(&self, message: &str, default: Option<&str>) -> Result<String>;
  /// Shows a message or results.
  fn reply(&self, content: ResponseContent) -> Result<()>;
}

impl UserInteraction for Cli {
  fn confirm(&self, message: &str, default: bool) -> Result<bool> {
    if self.accept_defaults {
      return Ok(default);
    }
    Ok(
      Confirm::new()
        .with_prompt(format!("{}{message}", style(PROMPT_PREFIX).cyan()))
        .default(default)
        .interact()?,
    )
  }

  fn prompt(&self, message: &str, default: Option<&str>) -> Result<String> {
    if self.accept_defaults {
      return default
        .map(str::to_string)
        .ok_or_else(|| CliError::Input(format!("No default available for \"{message}\"")));
    }
    let mut input =
      Input::<String>::new().with_prompt(format!("{}{message}", style(PROMPT_PREFIX).cyan()));
    if let Some(default) = default {
      input = input.default(default.to_string());
    }
    Ok(input.interact_text()?)
  }

  fn reply(&self, content: ResponseContent) -> Result<()> {
    match content {
      ResponseContent::Papers([]) => return self.reply(ResponseContent::Info(NO_PAPERS)),
      ResponseContent::Papers(papers) => print_papers(papers),
      ResponseContent::Working(message) => println!("{}{message}", style(WORKING_PREFIX).cyan()),
      ResponseContent::Success(message) => println!("{}{message}", style(SUCCESS_PREFIX).green()),
      ResponseContent::Warning(message) =>
        eprintln!("{}{}", style(WARNING_PREFIX).yellow(), style(message).yellow()),
      ResponseContent::Error(error) =>
        eprintln!("{}{}", style(ERROR_PREFIX).red(), style(error).red()),
      ResponseContent::Info(message) => println!("{}{message}", style(INFO_PREFIX).blue()),
    }
    Ok(())
  }
}

/// Prints papers as a tree, one branch per paper.
fn print_papers(papers: &[PaperResult]) {
  println!(
    "{}Found {} {} with company-affiliated authors",
    style(SUCCESS_PREFIX).green(),
    style(papers.len()).bold(),
    if papers.len() == 1 { "paper" } else { "papers" }
  );

  for (index, paper) in papers.iter().enumerate() {
    let (branch, trunk) = if index + 1 == papers.len() {
      (LAST_ITEM_PREFIX, LAST_CONTINUE_PREFIX)
    } else {
      (ITEM_PREFIX, CONTINUE_PREFIX)
    };
    let row = ReportRow::from(paper);

    println!("{} {} {}", style(branch).dim(), style(&row.paper_id).yellow(), style(&row.title).bold());
    for (label, value) in [
      ("Published:", &row.publication_date),
      ("Authors:", &row.authors),
      ("Companies:", &row.companies),
      ("Email:", &row.email),
    ] {
      println!("{}  {} {}", style(trunk).dim(), style(label).green(), value);
    }
  }
}
