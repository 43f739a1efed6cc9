//! Usage banner rendering.
//!
//! A banner is the program description, word-wrapped, followed by one
//! bracketed option per command:
//!
//! ```text
//! Fetch and browse emoji.
//!
//! usage: emojipedia [[build [package=<string>, force=<bool>]] [--list-all]
//!                 [get [args [...any]]]]
//! ```

use crate::types::{ArgKind, ArgumentDescriptor, FunctionDescriptor};

/// Column budget for every rendered line.
pub const LINE_LENGTH: usize = 79;

/// Render a full usage banner at [`LINE_LENGTH`] columns.
pub fn render_usage<'a>(
    program: &str,
    description: &str,
    descriptors: impl IntoIterator<Item = &'a FunctionDescriptor>,
) -> String {
    render_usage_with_width(program, description, descriptors, LINE_LENGTH)
}

/// Render a full usage banner at `width` columns.
pub fn render_usage_with_width<'a>(
    program: &str,
    description: &str,
    descriptors: impl IntoIterator<Item = &'a FunctionDescriptor>,
    width: usize,
) -> String {
    format!(
        "{}\n\n{}",
        wrap_description(description, width),
        wrap_options(program, descriptors, width)
    )
}

/// Render one argument: `name [...type]` for a variadic slot,
/// `name=[...type]` for a sequence and `name=<type>` otherwise.
pub fn argument_string(argument: &ArgumentDescriptor) -> String {
    let rendered = if argument.is_variadic_slot {
        format!("{} [...{}]", argument.name, argument.display_type)
    } else if argument.kind == ArgKind::Sequence {
        format!("{}=[...{}]", argument.name, argument.display_type)
    } else {
        format!("{}=<{}>", argument.name, argument.display_type)
    };
    rendered.to_lowercase()
}

/// Render a command: `name [arg, ...]`, or `--name` when it takes no
/// arguments.
pub fn function_string(function: &FunctionDescriptor) -> String {
    if function.is_empty() {
        return format!("--{}", function.display_name);
    }
    let arguments: Vec<String> = function.arguments.iter().map(argument_string).collect();
    format!("{} [{}]", function.display_name, arguments.join(", "))
}

/// The bracketed option token for a command.
pub fn option_token(function: &FunctionDescriptor) -> String {
    format!("[{}]", function_string(function))
}

/// Word-wrap `paragraph` so each line stays under `width` columns.
///
/// Words are separated by single spaces. A word longer than the budget is
/// placed on a line of its own rather than split.
pub fn wrap_description(paragraph: &str, width: usize) -> String {
    let mut lines = Vec::new();
    let mut line = String::new();

    for word in paragraph.split_whitespace() {
        if !line.is_empty() && columns(&line) + 1 + columns(word) >= width {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    if !line.is_empty() {
        lines.push(line);
    }

    lines.join("\n")
}

/// Pack option tokens after a `usage: <program> [` prefix.
///
/// Tokens are added to the current line while it, plus the closing `]`,
/// fits in `width`. Continuation lines are indented by the width of
/// `usage: <program>`. A token is never split.
pub fn wrap_options<'a>(
    program: &str,
    descriptors: impl IntoIterator<Item = &'a FunctionDescriptor>,
    width: usize,
) -> String {
    let prefix = format!("usage: {}", program);
    let indent = " ".repeat(columns(&prefix));

    let mut lines = Vec::new();
    let mut line = format!("{} [", prefix);
    let mut line_has_token = false;

    for token in descriptors.into_iter().map(option_token) {
        if line_has_token && columns(&line) + 1 + columns(&token) + 1 > width {
            lines.push(std::mem::replace(&mut line, indent.clone()));
            line_has_token = false;
        }
        if line_has_token {
            line.push(' ');
        }
        line.push_str(&token);
        line_has_token = true;
    }

    line.push(']');
    lines.push(line);
    lines.join("\n")
}

fn columns(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::introspect::{Identity, ParamType, Signature};
    use crate::types::{Dynamic, Variadic};

    fn descriptor(
        symbol: &'static str,
        parameters: Vec<ParamType>,
        names: &[&str],
    ) -> FunctionDescriptor {
        let sig = Signature::from_parts(Identity::of::<()>(), symbol, parameters);
        FunctionDescriptor::new(&sig, names.iter().map(|n| n.to_string()).collect()).unwrap()
    }

    fn build() -> FunctionDescriptor {
        descriptor(
            "app::Build",
            vec![ParamType::of::<String>(), ParamType::of::<bool>()],
            &["target", "force"],
        )
    }

    #[test]
    fn zero_argument_function_is_a_flag() {
        let desc = descriptor("app::ListAll", vec![], &[]);
        assert_eq!(function_string(&desc), "--list-all");
        assert_eq!(option_token(&desc), "[--list-all]");
    }

    #[test]
    fn scalar_arguments() {
        assert_eq!(
            function_string(&build()),
            "build [target=<string>, force=<bool>]"
        );
    }

    #[test]
    fn sequence_and_variadic_arguments() {
        let desc = descriptor(
            "app::Remove",
            vec![
                ParamType::of::<Vec<String>>(),
                ParamType::of::<Variadic<Dynamic>>(),
            ],
            &["packages", "rest"],
        );
        assert_eq!(
            function_string(&desc),
            "remove [packages=[...string], rest [...any]]"
        );
    }

    #[test]
    fn description_wraps_under_width() {
        let text = "one two three four five six seven";
        assert_eq!(wrap_description(text, 14), "one two three\nfour five six\nseven");
    }

    #[test]
    fn description_collapses_whitespace() {
        assert_eq!(wrap_description("  a   b\nc ", 79), "a b c");
        assert_eq!(wrap_description("", 79), "");
    }

    #[test]
    fn long_word_stands_alone() {
        let long = "x".repeat(90);
        let text = format!("short {} tail", long);
        let wrapped = wrap_description(&text, 79);
        let lines: Vec<_> = wrapped.lines().collect();
        assert_eq!(lines, vec!["short", long.as_str(), "tail"]);
    }

    #[test]
    fn options_with_no_commands() {
        assert_eq!(wrap_options("prog", [], 79), "usage: prog []");
    }

    #[test]
    fn options_fit_on_one_line() {
        let flag = descriptor("app::ListAll", vec![], &[]);
        assert_eq!(
            wrap_options("prog", [&build(), &flag], 79),
            "usage: prog [[build [target=<string>, force=<bool>]] [--list-all]]"
        );
    }

    #[test]
    fn options_continue_with_prefix_indent() {
        let flags: Vec<_> = ["app::Alpha", "app::Bravo", "app::Charlie"]
            .into_iter()
            .map(|s| descriptor(s, vec![], &[]))
            .collect();
        let rendered = wrap_options("prog", &flags, 30);
        assert_eq!(
            rendered,
            "usage: prog [[--alpha]\n           [--bravo]\n           [--charlie]]"
        );
    }

    #[test]
    fn every_line_fits_the_budget() {
        let flags: Vec<_> = [
            "app::Categories",
            "app::Subcategories",
            "app::Keywords",
            "app::Encyclopedia",
            "app::Unicode",
            "app::ListAll",
            "app::RemoveAll",
            "app::BuildEverything",
        ]
        .into_iter()
        .map(|s| descriptor(s, vec![], &[]))
        .chain(std::iter::repeat_with(build).take(4))
        .collect();

        let description = "Emojipedia is a command line tool for building, browsing and \
            searching a local copy of the emoji encyclopedia, including categories, \
            subcategories and keyword indexes.";
        let usage = render_usage("emojipedia", description, &flags);
        for line in usage.lines() {
            assert!(line.chars().count() <= LINE_LENGTH, "too long: {line:?}");
        }
        assert!(usage.ends_with(']'));
        assert_eq!(usage.matches("[--").count(), 8);
    }

    #[test]
    fn usage_joins_blocks_with_blank_line() {
        let usage = render_usage("prog", "Does things.", []);
        assert_eq!(usage, "Does things.\n\nusage: prog []");
    }
}
