//! Line commands for the terminal front-end. Each command maps onto one
//! workflow transition or one read-only view.

pub mod capture;
pub mod history;

use std::io;

use anyhow::{anyhow, bail, Result};
use tokio::io::{AsyncBufRead, Lines};

use crate::models::{CaptureMode, DraftField};
use crate::services::history::HistoryFilter;
use crate::services::workflow::CaptureWorkflow;

pub const HELP: &str = "\
Commands:
  mode scan|manual         switch capture mode (clears the draft)
  options                  open the capture picker (scan mode)
  cancel                   close the capture picker
  upload <file name>       upload a receipt from the gallery
  camera                   open the camera preview
  close                    close the camera preview
  capture                  take the camera shot
  set <field> <value>      edit merchant|amount|date|category|paymentMethod|notes
  save                     validate and generate the review
  confirm                  save the reviewed expense
  error <id>               preview a simulated error (camera|ocr|network|validation|save)
  dismiss                  close the error overlay
  history [category=..] [mode=..]
  show <id>                expense detail
  options-list             category and payment method choices
  view                     redraw the capture screen
  help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Mode(CaptureMode),
    Options,
    CancelOptions,
    Upload(String),
    Camera,
    CloseCamera,
    Capture,
    Set(DraftField, String),
    Save,
    Confirm,
    TriggerError(String),
    Dismiss,
    History(HistoryFilter),
    Show(String),
    OptionLists,
    View,
    Help,
    Quit,
}

pub fn parse(line: &str) -> Result<Command> {
    let line = line.trim();
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let command = match verb.to_ascii_lowercase().as_str() {
        "mode" => Command::Mode(rest.parse()?),
        "options" => Command::Options,
        "cancel" => Command::CancelOptions,
        "upload" => {
            if rest.is_empty() {
                bail!("upload needs a file name");
            }
            Command::Upload(rest.to_string())
        }
        "camera" => Command::Camera,
        "close" => Command::CloseCamera,
        "capture" => Command::Capture,
        "set" => {
            let (field, value) = match rest.split_once(char::is_whitespace) {
                Some((field, value)) => (field, value.trim()),
                None => (rest, ""),
            };
            Command::Set(field.parse()?, value.to_string())
        }
        "save" => Command::Save,
        "confirm" => Command::Confirm,
        "error" => Command::TriggerError(rest.to_string()),
        "dismiss" => Command::Dismiss,
        "history" => Command::History(parse_filter(rest)?),
        "show" => Command::Show(rest.to_string()),
        "options-list" => Command::OptionLists,
        "view" | "" => Command::View,
        "help" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(anyhow!("Unknown command: {other}. Type `help` for a list.")),
    };
    Ok(command)
}

fn parse_filter(args: &str) -> Result<HistoryFilter> {
    let mut filter = HistoryFilter::all();
    let mut rest = args;
    while !rest.is_empty() {
        let (key, tail) = rest
            .split_once('=')
            .ok_or_else(|| anyhow!("Filters look like category=Transport or mode=scan"))?;
        // Values run up to the next `key=` so categories may contain spaces.
        let next_key = ["category=", "mode="]
            .iter()
            .filter_map(|k| tail.find(k))
            .min()
            .unwrap_or(tail.len());
        let value = tail[..next_key].trim();
        match key.trim() {
            "category" => filter.category = Some(value.to_string()).filter(|v| !v.is_empty()),
            "mode" => filter.mode = Some(value.parse()?),
            other => bail!("Unknown filter: {other}"),
        }
        rest = tail[next_key..].trim_start();
    }
    Ok(filter)
}

/// Runs one command and returns what to print. Workflow rejections are
/// rendered, never propagated.
pub fn execute(workflow: &mut CaptureWorkflow, command: Command, currency: &str) -> String {
    let outcome = match command {
        Command::Mode(mode) => {
            workflow.select_mode(mode);
            Ok(())
        }
        Command::Options => workflow.open_capture_options(),
        Command::CancelOptions => workflow.cancel_capture_options(),
        Command::Upload(name) => workflow.choose_upload(&name).map(|_| ()),
        Command::Camera => workflow.choose_camera(),
        Command::CloseCamera => workflow.close_camera(),
        Command::Capture => workflow.capture_from_camera().map(|_| ()),
        Command::Set(field, value) => {
            workflow.edit_field(field, value);
            Ok(())
        }
        Command::Save => workflow.save().map(|_| ()),
        Command::Confirm => workflow.confirm().map(|_| ()),
        Command::TriggerError(id) => workflow.trigger_error(&id).map(|_| ()),
        Command::Dismiss => {
            workflow.dismiss_error();
            Ok(())
        }
        Command::History(filter) => return history::render_list(workflow.expenses(), &filter, currency),
        Command::Show(id) => return history::render_detail(workflow.expenses(), &id),
        Command::OptionLists => return capture::render_option_lists(),
        Command::View => Ok(()),
        Command::Help => return HELP.to_string(),
        Command::Quit => return String::new(),
    };

    match outcome {
        Ok(()) => capture::render(workflow, currency),
        // Validation failures already sit in the status banner.
        Err(crate::error::CaptureError::Validation(_)) => capture::render(workflow, currency),
        Err(err) => format!("! {err}"),
    }
}

/// One read from the terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Line(String),
    /// A line that was not valid UTF-8; it has been consumed.
    Unreadable(String),
    Closed,
}

/// Reads the next line. A line that is not UTF-8 is reported as
/// [`Input::Unreadable`] so the session can keep going; other read errors are
/// returned. Cancel safe, like [`Lines::next_line`].
pub async fn next_input<R>(lines: &mut Lines<R>) -> io::Result<Input>
where
    R: AsyncBufRead + Unpin,
{
    match lines.next_line().await {
        Ok(Some(line)) => Ok(Input::Line(line)),
        Ok(None) => Ok(Input::Closed),
        Err(err) if err.kind() == io::ErrorKind::InvalidData => Ok(Input::Unreadable(err.to_string())),
        Err(err) => Err(err),
    }
}
