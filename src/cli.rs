/// This module defines the command-line interface for the playground.
use std::path::PathBuf;

use clap::{arg, command, value_parser, ArgAction, Command};

const BEHAVIOR: &str = "Template Behavior";
const ADVANCED: &str = "Advanced";

pub(super) fn make_command() -> Command {
    command!()
        .max_term_width(120)
        .args([
            arg!(-d --data <FILE> "Path to a JSON data file")
                .long_help("\
                    Path to a JSON data file supplying the context (variables) for the \
                    template.  The toplevel of the document must be an object.  Use '-' \
                    to read the data from stdin, which is only possible when the template \
                    itself does not come from stdin.\n\n\
                    \
                    When no data file is given the built-in sample context is used, \
                    unless --no-sample is passed.")
                .value_parser(value_parser!(PathBuf)),
            arg!(-D --define <EXPR> "Defines an input variable (key=value / key:=json_value)")
                .long_help("\
                    This defines an input variable for the template in addition to the \
                    data file.  It supports three forms: key defines a single bool, \
                    key=value defines a string value, key:=json_value defines a JSON \
                    value.  It can be supplied multiple times.\n\n\
                    \
                    Examples:\n\
                    -D name=Peter       defines a basic string\n\
                    -D user_id:=42      defines an integer\n\
                    -D is_active:=true  defines a boolean\n\
                    -D is_true          shortform to define true boolean")
                .action(ArgAction::Append),
            arg!(--lenient "Allow undefined variables in templates")
                .long_help("\
                    Renders undefined variables as empty strings instead of failing.\n\n\
                    \
                    By default the playground runs the engine in strict mode where any \
                    access to an undefined variable or attribute is an error.  This flag \
                    switches to the engine's lenient behavior.  Inside the REPL the mode \
                    can also be flipped at runtime with the .mode command.\n\n\
                    \
                    [env var: JINJAPAD_LENIENT]")
                .help_heading(BEHAVIOR),
            arg!(--"no-sample" "Do not preload the built-in sample context")
                .long_help("\
                    Starts from an empty context instead of the built-in sample data.\n\n\
                    \
                    The sample context is a small companies/founders structure that makes \
                    the playground immediately explorable.  Pass this flag when you only \
                    want your own data file and defines visible.\n\n\
                    \
                    [env var: JINJAPAD_SAMPLE]")
                .help_heading(BEHAVIOR),
            arg!(-n --"no-newline" "Do not output a trailing newline")
                .long_help("\
                    Do not output a trailing newline after template evaluation.\n\n\
                    \
                    [env var: JINJAPAD_NEWLINE]")
                .help_heading(BEHAVIOR),
            arg!(--fuel <AMOUNT> "Configures the maximum fuel")
                .long_help("\
                    Sets the maximum fuel a template can consume.\n\n\
                    \
                    When fuel is set, every engine instruction consumes a certain amount \
                    of fuel.  This is handy when exploring templates with loops that \
                    might run away.  0 (the default) disables the fuel feature.\n\n\
                    \
                    [env var: JINJAPAD_FUEL]")
                .value_parser(value_parser!(u64))
                .help_heading(BEHAVIOR),
            arg!(-t --template <TEMPLATE_STRING> "Render a string template")
                .long_help("\
                    Renders a template from a string instead of a file.\n\n\
                    \
                    Note that this is different from --expr which evaluates a single \
                    expression instead.\n\n\
                    \
                    Example: jinjapad --template='Hello {{ name }}' -Dname=World")
                .conflicts_with("template_file"),
            arg!(-E --expr <EXPR> "Evaluates a template expression")
                .long_help("\
                    Evaluates a template expression against the context instead of \
                    rendering a template.  The result is emitted according to \
                    --expr-out.\n\n\
                    \
                    Example: jinjapad --expr='companies | length'")
                .conflicts_with_all(["template", "template_file"])
                .help_heading(ADVANCED),
            arg!(--"expr-out" <MODE> "The expression output mode")
                .long_help("\
                    Sets the expression output mode for --expr.\n\n\
                    \
                    'print' writes the result of the expression to stdout, 'json' and \
                    'json-pretty' write it as JSON instead.\n\n\
                    \
                    [env var: JINJAPAD_EXPR_OUT]")
                .value_parser(["print", "json", "json-pretty"])
                .requires("expr")
                .help_heading(ADVANCED),
            arg!(--repl "Starts the interactive console")
                .long_help("\
                    Starts the read-eval loop with the assembled context.\n\n\
                    \
                    This is also the default when neither a template nor an expression \
                    is given.  The REPL evaluates expressions, renders template snippets \
                    with .render and can flip the undefined-variable mode with .mode.")
                .conflicts_with_all(["expr", "template", "template_file"]),
            arg!(-o --output <FILENAME> "Path to the output file")
                .long_help("\
                    Path to the output file instead of stdout.\n\n\
                    \
                    Files are written atomically: if template evaluation fails the \
                    original file remains untouched.")
                .default_value("-")
                .value_parser(value_parser!(PathBuf)),
            arg!(template_file: [TEMPLATE_FILE] "Path to the input template")
                .long_help("\
                    Path to the input template in MiniJinja/Jinja2 syntax.  Use '-' to \
                    read the template from stdin.  When omitted (and no --template or \
                    --expr is given) the interactive console starts instead."),
        ])
        .about("jinjapad is an interactive playground for MiniJinja templates.")
        .after_help(
            "Run without arguments to start the console with the built-in sample \
            context.  For extended help use --help.",
        )
}
