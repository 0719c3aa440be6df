/*!
 * Interchange documents: the per-language XLIFF 1.2 files sent to
 * translators, their in-memory model and the assembler that builds them.
 */

pub mod assembler;
pub mod model;
pub mod xliff;

pub use assembler::{AssembledDocument, Assembler, AssemblyStats, CommentDetail, SourceRow, build};
pub use model::{DocumentMetadata, InterchangeDocument, Segment, SegmentId, TargetState};
pub use xliff::{ParsedDocument, read_document, write_document};
