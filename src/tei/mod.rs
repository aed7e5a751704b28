/*!
 * TEI alignment-projection engine.
 *
 * This module contains the TEI-specific pipeline stages:
 * - `parser`: document parsing and alignable unit extraction
 * - `mapper`: resolving alignment groups back onto document units
 * - `projector`: rewriting document trees with alignment identifiers
 * - `assembler`: building the final standoff corpus
 */

pub mod assembler;
pub mod mapper;
pub mod parser;
pub mod projector;

pub use assembler::{AssembledCorpus, TEI_NAMESPACE, assemble};
pub use mapper::{AlignmentMap, Granularity, MapEntry, PendingLink, build_maps};
pub use parser::{AlignableUnit, TeiDocument, UnitKind, parse_tei};
pub use projector::{ProjectedDocument, project};
