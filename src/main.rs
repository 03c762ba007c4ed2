use std::borrow::Cow;
use std::path::Path;

use reedline::{
    default_emacs_keybindings, EditCommand, Emacs, KeyCode, KeyModifiers, Prompt, PromptEditMode,
    PromptHistorySearch, Reedline, ReedlineEvent, Signal,
};

use loxide::Session;

fn main() {
    env_logger::init();

    let args = std::env::args_os().collect::<Vec<_>>();

    match args.len() {
        1 => run_repl(),
        2 => run_file(&args[1]),
        _ => {
            println!("Usage: loxide [script]");
            std::process::exit(64);
        }
    }
}

fn run_file(file: impl AsRef<Path>) {
    let code = match std::fs::read_to_string(file) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("{error}");
            std::process::exit(2);
        }
    };

    if let Err(errors) = loxide::run(code) {
        eprintln!("{}", errors.render());
        std::process::exit(errors.exit_code());
    }
}

fn run_repl() {
    let mut line_editor = line_editor();
    let mut session = Session::new();

    loop {
        let sig = line_editor.read_line(&PlainPrompt);
        let line = match sig {
            Ok(Signal::Success(buffer)) => buffer,
            Ok(Signal::CtrlC) | Ok(Signal::CtrlD) => break,
            Err(error) => {
                eprintln!("{error}");
                break;
            }
        };

        // errors never end the session; the next turn starts clean
        if let Err(errors) = session.run(&line) {
            eprintln!("{}", errors.render());
        }
    }
}

fn line_editor() -> Reedline {
    let mut keybindings = default_emacs_keybindings();

    keybindings.add_binding(
        KeyModifiers::ALT,
        KeyCode::Enter,
        ReedlineEvent::Edit(vec![EditCommand::InsertNewline]),
    );

    Reedline::create().with_edit_mode(Box::new(Emacs::new(keybindings)))
}

struct PlainPrompt;

impl Prompt for PlainPrompt {
    fn render_prompt_left(&self) -> Cow<str> {
        Cow::Borrowed("")
    }

    fn render_prompt_right(&self) -> Cow<str> {
        Cow::Borrowed("")
    }

    fn render_prompt_indicator(&self, _edit_mode: PromptEditMode) -> Cow<str> {
        Cow::Borrowed("> ")
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<str> {
        Cow::Borrowed(".. ")
    }

    fn render_prompt_history_search_indicator(
        &self,
        _history_search: PromptHistorySearch,
    ) -> Cow<str> {
        Cow::Borrowed("? ")
    }
}
