// Transcript rendering - one block per paragraph that produces visible output

use crate::domain::CommandSpec;

const INPUT_LABEL: &[u8] = b"(input)\n";
const OUTPUT_LABEL: &[u8] = b"(output)\n";

/// A transcript block, rendered only after its dispatch fully succeeded
#[derive(Debug, Clone, Copy)]
pub enum Block<'a> {
    /// Single-command mode
    Single { input: &'a [u8], output: &'a [u8] },
    /// Diff mode, outputs differ
    Mismatch {
        input: &'a [u8],
        primary: &'a CommandSpec,
        primary_output: &'a [u8],
        reference: &'a CommandSpec,
        reference_output: &'a [u8],
    },
}

impl Block<'_> {
    /// Render the block, terminated by a blank line
    ///
    /// Command output is copied verbatim; no newline is added if it lacks one.
    pub fn render(&self, output_only: bool) -> Vec<u8> {
        let mut buf = Vec::new();

        match *self {
            Block::Single { input, output } => {
                write_input(&mut buf, input, output_only);
                buf.extend_from_slice(OUTPUT_LABEL);
                buf.extend_from_slice(output);
            }
            Block::Mismatch {
                input,
                primary,
                primary_output,
                reference,
                reference_output,
            } => {
                write_input(&mut buf, input, output_only);
                write_labeled(&mut buf, primary, primary_output);
                write_labeled(&mut buf, reference, reference_output);
            }
        }

        buf.push(b'\n');
        buf
    }
}

fn write_input(buf: &mut Vec<u8>, input: &[u8], output_only: bool) {
    if !output_only {
        buf.extend_from_slice(INPUT_LABEL);
        buf.extend_from_slice(input);
    }
}

fn write_labeled(buf: &mut Vec<u8>, spec: &CommandSpec, output: &[u8]) {
    buf.extend_from_slice(format!("(output: {})\n", spec.display()).as_bytes());
    buf.extend_from_slice(output);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_block() {
        let block = Block::Single {
            input: b"x\n",
            output: b"x\n",
        };
        assert_eq!(block.render(false), b"(input)\nx\n(output)\nx\n\n");
    }

    #[test]
    fn test_single_block_output_only() {
        let block = Block::Single {
            input: b"x\n",
            output: b"X\n",
        };
        assert_eq!(block.render(true), b"(output)\nX\n\n");
    }

    #[test]
    fn test_mismatch_block_uses_display_strings() {
        let primary = CommandSpec::parse("tr a-z A-Z").unwrap();
        let reference = CommandSpec::parse("cat").unwrap();
        let block = Block::Mismatch {
            input: b"hi\n",
            primary: &primary,
            primary_output: b"HI\n",
            reference: &reference,
            reference_output: b"hi\n",
        };

        let expected = "(input)\nhi\n(output: tr a-z A-Z)\nHI\n(output: cat)\nhi\n\n";
        assert_eq!(String::from_utf8(block.render(false)).unwrap(), expected);

        let expected = "(output: tr a-z A-Z)\nHI\n(output: cat)\nhi\n\n";
        assert_eq!(String::from_utf8(block.render(true)).unwrap(), expected);
    }

    #[test]
    fn test_output_without_trailing_newline_kept_verbatim() {
        let block = Block::Single {
            input: b"a\n",
            output: b"no-newline",
        };
        assert_eq!(block.render(true), b"(output)\nno-newline\n");
    }
}
