/*!
 * Round-trip packing of tagged script files.
 *
 * - `tag_grammar`: structural markers and index tags
 * - `unpacker`: extracts tagged text into an indexed, translator-friendly stream
 * - `repacker`: writes a translated stream back into the original structure
 * - `aligner`: repairs index tags damaged during manual editing
 *
 * The pure transforms in each submodule work on in-memory line vectors; the
 * `Unpacker`, `Repacker` and `Aligner` types wrap them with file I/O.
 */

pub mod tag_grammar;
pub mod unpacker;
pub mod repacker;
pub mod aligner;

pub use tag_grammar::Role;
pub use unpacker::{ExtractedBlock, ExtractedUnit, Unpacker};
pub use repacker::{Repacker, TranslationIndex};
pub use aligner::Aligner;
