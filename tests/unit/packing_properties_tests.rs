/*!
 * Property tests for the unpack/repack round trip
 */

use proptest::prelude::*;
use std::collections::HashSet;

use xmlpack::errors::PackError;
use xmlpack::file_utils::FileManager;
use xmlpack::packager::repacker::{apply_entries, apply_translation, TranslatedLine};
use xmlpack::packager::tag_grammar::{escape_newlines, unescape_newlines};
use xmlpack::packager::unpacker::{extract_blocks, partition_blocks};
use xmlpack::packager::{Role, TranslationIndex};

/// Piece of a generated structured file
#[derive(Debug, Clone)]
enum Segment {
    Plain(String),
    Simple { indent: String, payload: String },
    Multi { open: String, middles: Vec<String>, close: String },
}

/// Payload text: no markers or line breaks, escaped newlines allowed
fn arb_payload() -> impl Strategy<Value = String> {
    prop_oneof![
        r"[a-zA-Zа-яА-Я0-9 .,!?;\[\]]{0,16}",
        proptest::collection::vec(r"[a-zA-Zа-я .]{0,6}", 1..4).prop_map(|parts| parts.join("\\n")),
    ]
}

/// Payload text that may also hold the newline placeholder or pieces of it
fn arb_noisy_payload() -> impl Strategy<Value = String> {
    let pieces = proptest::sample::select(vec![";NEW_LINE;", ";NEW_LINE", "NEW_LINE;", "\\n", ";", " ", "a", "я"]);
    prop_oneof![
        arb_payload(),
        proptest::collection::vec(pieces, 0..8).prop_map(|pieces| pieces.concat()),
    ]
}

fn arb_segment(payload: BoxedStrategy<String>) -> impl Strategy<Value = Segment> {
    prop_oneof![
        r#"[a-z0-9 ="/]{0,20}"#.prop_map(Segment::Plain),
        (r" {0,4}", payload.clone()).prop_map(|(indent, payload)| Segment::Simple { indent, payload }),
        (payload.clone(), proptest::collection::vec(payload.clone(), 0..3), payload)
            .prop_map(|(open, middles, close)| Segment::Multi { open, middles, close }),
    ]
}

fn arb_file_with(payload: BoxedStrategy<String>) -> impl Strategy<Value = Vec<String>> {
    (proptest::collection::vec(arb_segment(payload), 0..10), any::<bool>())
        .prop_map(|(segments, crlf)| render_file(&segments, if crlf { "\r\n" } else { "\n" }))
}

fn arb_file() -> impl Strategy<Value = Vec<String>> {
    arb_file_with(arb_payload().boxed())
}

fn render_file(segments: &[Segment], terminator: &str) -> Vec<String> {
    let mut lines = Vec::new();
    for segment in segments {
        match segment {
            Segment::Plain(text) => lines.push(format!("{}{}", text, terminator)),
            Segment::Simple { indent, payload } => {
                lines.push(format!("{}<s><text>{}</text></s>{}", indent, payload, terminator))
            }
            Segment::Multi { open, middles, close } => {
                lines.push(format!("<s><text>{}{}", open, terminator));
                for middle in middles {
                    lines.push(format!("{}{}", middle, terminator));
                }
                lines.push(format!("{}</text></s>{}", close, terminator));
            }
        }
    }
    lines
}

fn unpacked_stream(lines: &[String]) -> String {
    extract_blocks(lines)
        .expect("generated file should extract")
        .iter()
        .map(|block| block.render())
        .collect()
}

proptest! {
    #[test]
    fn test_roundTrip_unchangedStream_shouldRebuildIdenticalFile(lines in arb_file()) {
        let stream = unpacked_stream(&lines);
        let index = TranslationIndex::parse(&FileManager::split_lines(&stream)).unwrap();

        let repacked = apply_translation(&lines, &index).unwrap();
        prop_assert_eq!(repacked.concat(), lines.concat());
    }

    #[test]
    fn test_roundTrip_placeholderLikeText_shouldRebuildFileOrRefuseIt(
        lines in arb_file_with(arb_noisy_payload().boxed()),
    ) {
        match extract_blocks(&lines) {
            Ok(blocks) => {
                let stream: String = blocks.iter().map(|block| block.render()).collect();
                let index = TranslationIndex::parse(&FileManager::split_lines(&stream)).unwrap();
                prop_assert_eq!(apply_translation(&lines, &index).unwrap().concat(), lines.concat());
            }
            Err(error) => {
                let refused = matches!(error, PackError::ReservedPlaceholder { .. });
                prop_assert!(refused, "unexpected error: {:?}", error);
                prop_assert!(lines.concat().contains("NEW_LINE"));
            }
        }
    }

    #[test]
    fn test_applyEntries_anyOrder_shouldGiveSameResult(
        lines in arb_file(),
        order in Just((0..64).collect::<Vec<usize>>()).prop_shuffle(),
    ) {
        let index = TranslationIndex::parse(&FileManager::split_lines(&unpacked_stream(&lines))).unwrap();
        let translated: Vec<(usize, TranslatedLine)> = index
            .iter()
            .map(|(i, line)| (i, TranslatedLine { role: line.role, text: format!("T{}", i) }))
            .collect();
        prop_assume!(translated.len() <= order.len());

        let in_order = apply_entries(&lines, translated.iter().map(|(i, line)| (*i, line))).unwrap();
        let shuffled = apply_entries(
            &lines,
            order
                .iter()
                .filter(|position| **position < translated.len())
                .map(|position| (translated[*position].0, &translated[*position].1)),
        )
        .unwrap();

        prop_assert_eq!(in_order, shuffled);
    }

    #[test]
    fn test_extractBlocks_indices_shouldBeStrictlyIncreasing(lines in arb_file()) {
        let blocks = extract_blocks(&lines).unwrap();
        let indices: Vec<usize> = blocks.iter().flat_map(|b| b.units.iter().map(|u| u.index)).collect();

        prop_assert!(indices.windows(2).all(|pair| pair[0] < pair[1]));
        prop_assert!(indices.iter().all(|index| *index >= 1 && *index <= lines.len()));
    }

    #[test]
    fn test_partitionBlocks_shouldRespectBudget(lines in arb_file(), limit in 10usize..200) {
        let blocks = extract_blocks(&lines).unwrap();
        let renders: HashSet<String> = blocks.iter().map(|block| block.render()).collect();
        let partitions = partition_blocks(&blocks, Some(limit));

        for partition in &partitions {
            prop_assert_eq!(partition.characters, partition.contents.chars().count());
            if partition.characters > limit {
                prop_assert!(renders.contains(&partition.contents));
            }
        }

        let joined: String = partitions.iter().map(|p| p.contents.as_str()).collect();
        let expected: String = blocks.iter().map(|block| block.render()).collect();
        prop_assert_eq!(joined, expected);
    }

    #[test]
    fn test_escapedNewlines_shouldSurviveRoundTrip(
        parts in proptest::collection::vec(r"[a-zA-Z .]{0,8}", 1..5),
    ) {
        let payload = parts.join("\\n");
        let escaped = escape_newlines(&payload);
        prop_assert!(!escaped.contains("\\n"));
        prop_assert_eq!(unescape_newlines(&escaped), payload.clone());

        let lines = vec![format!("<text>{}</text>\n", payload)];
        let index = TranslationIndex::parse(&FileManager::split_lines(&unpacked_stream(&lines))).unwrap();
        prop_assert_eq!(index.get(1).map(|line| line.role), Some(Role::Simple));
        prop_assert_eq!(apply_translation(&lines, &index).unwrap(), lines);
    }
}
