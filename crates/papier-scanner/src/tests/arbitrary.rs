use alloc::{string::String, vec::Vec};

use quickcheck::{Arbitrary, Gen};

/// A well-formed Papier document: text lines and nested blocks, every block
/// closed by its own terminator.
#[derive(Debug, Clone)]
pub(crate) struct Document(pub(crate) String);

/// Arbitrary text over the characters the scanner cares about.
#[derive(Debug, Clone)]
pub(crate) struct Noise(pub(crate) String);

const OPENERS: &[(&str, &str, &str)] = &[
    // (marker after `{`, terminator word, terminator indentation)
    ("EOF", "EOF", ""),
    ("END", "END", ""),
    ("A", "A", ""),
    ("'RAW'", "RAW", ""),
    ("\"Q W\"", "Q W", ""),
    ("\\ESC", "ESC", ""),
    ("-IND", "IND", "\t "),
];

const LINES: &[&str] = &[
    "text\n",
    "\n",
    "EOF\n",
    "ENDX}\n",
    "END} tail\n",
    "  indented\n",
    "{\n",
    "{ \n",
    "* title \n",
    "a\\b\n",
    "ünïcödé\n",
    "crlf\r\n",
];

// Only generated inside blocks: at the top level `{X` would open a block
// that nothing closes.
const BLOCK_LINES: &[&str] = &["END}A}\n", "END}{X\n", "EOF}{EOF\n", "A}{A\n"];

const NOISE: &[char] = &[
    '{', '}', '\n', '\r', ' ', '\t', '\\', '\'', '"', '-', 'E', 'O', 'F', 'A', 'x', 'é',
];

fn gen_text(g: &mut Gen, out: &mut String) {
    let lines = usize::arbitrary(g) % 5;
    for _ in 0..lines {
        out.push_str(g.choose(LINES).copied().unwrap_or("\n"));
    }
}

/// Body of a block at nesting `depth`, counting from one.
fn gen_body(g: &mut Gen, out: &mut String, depth: usize) {
    let lines = usize::arbitrary(g) % 5;
    for _ in 0..lines {
        if depth < 4 && bool::arbitrary(g) && bool::arbitrary(g) {
            gen_block(g, out, depth + 1);
        } else if u8::arbitrary(g) % 4 == 0 {
            out.push_str(g.choose(BLOCK_LINES).copied().unwrap_or("\n"));
        } else {
            out.push_str(g.choose(LINES).copied().unwrap_or("\n"));
        }
    }
}

fn gen_block(g: &mut Gen, out: &mut String, depth: usize) {
    let (marker, word, indent) = g.choose(OPENERS).copied().unwrap_or(OPENERS[0]);
    out.push('{');
    out.push_str(marker);
    out.push('\n');
    gen_body(g, out, depth);
    out.push_str(indent);
    out.push_str(word);
    out.push_str("}\n");
}

impl Arbitrary for Document {
    fn arbitrary(g: &mut Gen) -> Self {
        let mut out = String::new();
        let items = 1 + usize::arbitrary(g) % 4;
        for _ in 0..items {
            if bool::arbitrary(g) {
                out.push_str("* title ");
                gen_block(g, &mut out, 1);
            } else {
                gen_text(g, &mut out);
            }
        }
        Document(out)
    }
}

impl Arbitrary for Noise {
    fn arbitrary(g: &mut Gen) -> Self {
        let picks: Vec<u8> = Vec::arbitrary(g);
        Noise(
            picks
                .iter()
                .map(|i| NOISE[usize::from(*i) % NOISE.len()])
                .collect(),
        )
    }

    fn shrink(&self) -> alloc::boxed::Box<dyn Iterator<Item = Self>> {
        let chars: Vec<char> = self.0.chars().collect();
        alloc::boxed::Box::new(
            chars
                .shrink()
                .map(|c| Noise(c.into_iter().collect())),
        )
    }
}
