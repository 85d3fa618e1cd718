//! Executes and reverts [`Command`]s against a [`LineTree`].
//!
//! `revert(execute(c))` restores the buffer to its pre-execute state for
//! every variant; property tests in this module assert exactly that.

use crate::command::Command;
use crate::error::CoreError;
use crate::line_tree::LineTree;

pub struct TextManipulator;

impl TextManipulator {
    /// Applies `cmd` to `tree`, filling in whatever memory the command
    /// needs to be reverted later. The mutated command is handed back so
    /// callers (history) can store it.
    pub fn execute(tree: &mut LineTree, mut cmd: Command) -> Result<Command, CoreError> {
        match &mut cmd {
            Command::InsertChar { row, col, byte } => {
                tree.insert(*row, *col, &[*byte])?;
            }
            Command::RemoveChar { row, col, removed } => {
                *removed = Some(tree.remove_char(*row, *col)?);
            }
            Command::RemoveSlice { row, col, len, removed } => {
                *removed = Some(tree.remove_slice(*row, *col, *len)?);
            }
            Command::DeleteLine { row, removed } => {
                *removed = Some(tree.delete_line(*row)?);
            }
            Command::SplitLine { row, col } => {
                tree.split_line(*row, *col)?;
            }
            Command::MergeLine { row, split_col } => {
                *split_col = Some(tree.merge_line(*row)?);
            }
        }
        Ok(cmd)
    }

    /// Inverts an already-executed `cmd`. Every variant must have been
    /// returned by [`Self::execute`] first, so its memory fields are filled in.
    pub fn revert(tree: &mut LineTree, cmd: &Command) -> Result<(), CoreError> {
        match cmd {
            Command::InsertChar { row, col, .. } => {
                tree.remove_char(*row, *col)?;
            }
            Command::RemoveChar { row, col, removed } => {
                let byte = removed.ok_or(CoreError::Irreversible("RemoveChar missing memory"))?;
                tree.insert(*row, *col, &[byte])?;
            }
            Command::RemoveSlice { row, col, removed, .. } => {
                let bytes = removed
                    .as_ref()
                    .ok_or(CoreError::Irreversible("RemoveSlice missing memory"))?;
                tree.insert(*row, *col, bytes)?;
            }
            Command::DeleteLine { row, removed } => {
                let line = removed
                    .clone()
                    .ok_or(CoreError::Irreversible("DeleteLine missing memory"))?;
                tree.insert_line(*row, line)?;
            }
            Command::SplitLine { row, col } => {
                tree.merge_line(*row)?;
                let _ = col;
            }
            Command::MergeLine { row, split_col } => {
                let col = split_col.ok_or(CoreError::Irreversible("MergeLine missing memory"))?;
                tree.split_line(*row, col)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_char_round_trip() {
        let mut tree = LineTree::from_lines(vec![b"hello".to_vec()], 8);
        let cmd = TextManipulator::execute(&mut tree, Command::insert_char(0, 5, b'!')).unwrap();
        assert_eq!(tree.nth_line(0).unwrap(), b"hello!");
        TextManipulator::revert(&mut tree, &cmd).unwrap();
        assert_eq!(tree.nth_line(0).unwrap(), b"hello");
    }

    #[test]
    fn remove_slice_round_trip() {
        let mut tree = LineTree::from_lines(vec![b"hello world".to_vec()], 8);
        let cmd = TextManipulator::execute(&mut tree, Command::remove_slice(0, 5, 6)).unwrap();
        assert_eq!(tree.nth_line(0).unwrap(), b"hello");
        TextManipulator::revert(&mut tree, &cmd).unwrap();
        assert_eq!(tree.nth_line(0).unwrap(), b"hello world");
    }

    #[test]
    fn split_then_merge_round_trip() {
        let mut tree = LineTree::from_lines(vec![b"helloworld".to_vec()], 8);
        let cmd = TextManipulator::execute(&mut tree, Command::split_line(0, 5)).unwrap();
        assert_eq!(tree.line_count(), 2);
        TextManipulator::revert(&mut tree, &cmd).unwrap();
        assert_eq!(tree.line_count(), 1);
        assert_eq!(tree.nth_line(0).unwrap(), b"helloworld");
    }

    #[test]
    fn merge_line_round_trip() {
        let mut tree = LineTree::from_lines(vec![b"abc".to_vec(), b"def".to_vec()], 8);
        let cmd = TextManipulator::execute(&mut tree, Command::merge_line(0)).unwrap();
        assert_eq!(tree.line_count(), 1);
        assert_eq!(tree.nth_line(0).unwrap(), b"abcdef");
        TextManipulator::revert(&mut tree, &cmd).unwrap();
        assert_eq!(tree.line_count(), 2);
        assert_eq!(tree.nth_line(0).unwrap(), b"abc");
        assert_eq!(tree.nth_line(1).unwrap(), b"def");
    }

    #[test]
    fn delete_line_round_trip() {
        let mut tree = LineTree::from_lines(vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()], 8);
        let cmd = TextManipulator::execute(&mut tree, Command::delete_line(1)).unwrap();
        assert_eq!(tree.line_count(), 2);
        TextManipulator::revert(&mut tree, &cmd).unwrap();
        assert_eq!(tree.line_count(), 3);
        assert_eq!(tree.nth_line(1).unwrap(), b"b");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone)]
    enum CmdSeed {
        InsertChar(usize, usize, u8),
        RemoveChar(usize, usize),
        RemoveSlice(usize, usize, usize),
        SplitLine(usize, usize),
        MergeLine(usize),
    }

    fn cmd_seed_strategy() -> impl Strategy<Value = CmdSeed> {
        prop_oneof![
            (any::<usize>(), any::<usize>(), b'a'..=b'z').prop_map(|(r, c, b)| CmdSeed::InsertChar(r, c, b)),
            (any::<usize>(), any::<usize>()).prop_map(|(r, c)| CmdSeed::RemoveChar(r, c)),
            (any::<usize>(), any::<usize>(), any::<usize>()).prop_map(|(r, c, l)| CmdSeed::RemoveSlice(r, c, l)),
            (any::<usize>(), any::<usize>()).prop_map(|(r, c)| CmdSeed::SplitLine(r, c)),
            any::<usize>().prop_map(CmdSeed::MergeLine),
        ]
    }

    proptest! {
        /// `revert(execute(c, B)) == B` for any single command, on any
        /// starting buffer, as long as the seed maps to a command that's
        /// actually valid against that buffer (invalid ones are skipped,
        /// not asserted on).
        #[test]
        fn single_command_round_trips(
            line_words in prop::collection::vec("[a-z]{0,5}", 1..6),
            seed in cmd_seed_strategy(),
        ) {
            let lines: Vec<Vec<u8>> = line_words.into_iter().map(String::into_bytes).collect();
            let mut tree = LineTree::from_lines(lines, 8);
            let before = tree.to_bytes();
            let n = tree.line_count();

            let cmd = match seed {
                CmdSeed::InsertChar(r, c, b) => {
                    let row = r % n;
                    let col = c % (tree.line_len(row).unwrap() + 1);
                    Command::insert_char(row, col, b)
                }
                CmdSeed::RemoveChar(r, c) => {
                    let row = r % n;
                    let len = tree.line_len(row).unwrap();
                    prop_assume!(len > 0);
                    Command::remove_char(row, c % len)
                }
                CmdSeed::RemoveSlice(r, c, l) => {
                    let row = r % n;
                    let len = tree.line_len(row).unwrap();
                    prop_assume!(len > 0);
                    let col = c % len;
                    let slice_len = 1 + (l % (len - col));
                    Command::remove_slice(row, col, slice_len)
                }
                CmdSeed::SplitLine(r, c) => {
                    let row = r % n;
                    let col = c % (tree.line_len(row).unwrap() + 1);
                    Command::split_line(row, col)
                }
                CmdSeed::MergeLine(r) => {
                    prop_assume!(n > 1);
                    Command::merge_line(r % (n - 1))
                }
            };

            let executed = TextManipulator::execute(&mut tree, cmd).unwrap();
            TextManipulator::revert(&mut tree, &executed).unwrap();
            prop_assert_eq!(tree.to_bytes(), before);
        }
    }
}
