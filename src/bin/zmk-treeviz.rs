//! ZMK Tree Visualization CLI Tool
//!
//! Parses a Zettelmarkup file and renders the resulting tree, either as a
//! tree-notation sketch or as JSON.
//!
//! Usage:
//!   zmk-treeviz <input-file> [options]
//!
//! Options:
//!   --format <format>    Output format: tree (default), json
//!   --inlines            Parse as a bare inline run (ParseInlines) instead
//!                        of a full document (ParseBlocks)
//!   --ascii              Use ASCII characters instead of Unicode box-drawing
//!   --no-color           Disable colored tag names even on a TTY

use std::fs;
use std::io::{self, Read, Write};

use clap::{Arg, ArgAction, Command};
use ego_tree::Tree;
use termcolor::{Buffer, Color, ColorSpec, WriteColor};

use zmk::tree::{Node, Value};

struct TreeChars {
    branch: &'static str,
    last: &'static str,
    vertical: &'static str,
    blank: &'static str,
}

impl TreeChars {
    fn unicode() -> Self {
        Self {
            branch: "├── ",
            last: "└── ",
            vertical: "│   ",
            blank: "    ",
        }
    }

    fn ascii() -> Self {
        Self {
            branch: "|-- ",
            last: "`-- ",
            vertical: "|   ",
            blank: "    ",
        }
    }
}

/// Flatten a parsed [`Node`] into an [`ego_tree::Tree`] of display labels,
/// one label per node plus one per scalar argument (text/int/attrs) so the
/// rendered tree shows a construct's payload, not just its tag.
fn build_tree(root: &Node) -> Tree<String> {
    let mut tree = Tree::new(root.tag.to_string());
    let mut root_id = tree.root().id();
    fill_children(&mut tree, &mut root_id, root);
    tree
}

fn fill_children(tree: &mut Tree<String>, parent: &mut ego_tree::NodeId, node: &Node) {
    for arg in &node.args {
        match arg {
            Value::Node(child) => {
                let mut child_id = tree.get_mut(*parent).unwrap().append(child.tag.to_string()).id();
                fill_children(tree, &mut child_id, child);
            }
            Value::Text(s) => {
                tree.get_mut(*parent).unwrap().append(format!("\"{s}\""));
            }
            Value::Int(n) => {
                tree.get_mut(*parent).unwrap().append(n.to_string());
            }
            Value::Attrs(attrs) => {
                let rendered = attrs
                    .iter()
                    .map(|(k, v)| if k.is_empty() { v.clone() } else { format!("{k}={v}") })
                    .collect::<Vec<_>>()
                    .join(" ");
                tree.get_mut(*parent).unwrap().append(format!("{{{rendered}}}"));
            }
        }
    }
}

fn render(tree: &Tree<String>, chars: &TreeChars, color: bool) -> io::Result<String> {
    let mut buf = if color { Buffer::ansi() } else { Buffer::no_color() };
    writeln!(buf, "{}", tree.root().value())?;
    render_children(&mut buf, tree.root(), "", chars)?;
    Ok(String::from_utf8_lossy(buf.as_slice()).into_owned())
}

fn render_children(
    buf: &mut Buffer,
    node: ego_tree::NodeRef<String>,
    prefix: &str,
    chars: &TreeChars,
) -> io::Result<()> {
    let children: Vec<_> = node.children().collect();
    for (i, child) in children.iter().enumerate() {
        let is_last = i + 1 == children.len();
        let connector = if is_last { chars.last } else { chars.branch };
        write!(buf, "{prefix}{connector}")?;
        write_label(buf, child.value())?;
        writeln!(buf)?;
        let next_prefix = format!("{prefix}{}", if is_last { chars.blank } else { chars.vertical });
        render_children(buf, *child, &next_prefix, chars)?;
    }
    Ok(())
}

/// Tag-looking labels (all-caps, hyphenated) are colored; everything else
/// (quoted text, attribute braces, integers) is left plain.
fn write_label(buf: &mut Buffer, label: &str) -> io::Result<()> {
    let looks_like_tag = label.chars().all(|c| c.is_ascii_uppercase() || c == '-')
        && label.chars().any(|c| c.is_ascii_uppercase());
    if looks_like_tag {
        buf.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true))?;
        write!(buf, "{label}")?;
        buf.reset()?;
    } else {
        write!(buf, "{label}")?;
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let matches = Command::new("zmk-treeviz")
        .version("0.1.0")
        .about("ZMK AST tree visualization tool")
        .arg(Arg::new("input").help("Input Zettelmarkup file (reads stdin if omitted)").index(1))
        .arg(
            Arg::new("format")
                .long("format")
                .value_name("FORMAT")
                .help("Output format: tree, json")
                .default_value("tree"),
        )
        .arg(
            Arg::new("inlines")
                .long("inlines")
                .help("Parse as a bare inline run instead of a full document")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("ascii")
                .long("ascii")
                .help("Use ASCII characters instead of Unicode")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no-color")
                .long("no-color")
                .help("Disable colored tag names")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let input = match matches.get_one::<String>("input") {
        Some(path) => fs::read(path)?,
        None => {
            let mut buf = Vec::new();
            io::stdin().read_to_end(&mut buf)?;
            buf
        }
    };

    let parsed = if matches.get_flag("inlines") {
        zmk::parse_inlines(&input)
    } else {
        zmk::parse_blocks(&input)
    };

    let Some(root) = parsed else {
        println!("(empty)");
        return Ok(());
    };

    let format = matches.get_one::<String>("format").unwrap();
    let output = match format.as_str() {
        "json" => serde_json::to_string_pretty(&root)?,
        "tree" => {
            let chars = if matches.get_flag("ascii") {
                TreeChars::ascii()
            } else {
                TreeChars::unicode()
            };
            let color = !matches.get_flag("no-color") && atty::is(atty::Stream::Stdout);
            let tree = build_tree(&root);
            render(&tree, &chars, color)?
        }
        other => {
            eprintln!("Error: unknown format '{other}'");
            std::process::exit(1);
        }
    };

    print!("{output}");
    io::stdout().flush()?;
    Ok(())
}
