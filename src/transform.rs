// nc_loader/src/transform.rs
// Turns a raw source row into a document using a resolved projection.

use mongodb::bson::{Bson, Document};

use crate::error::{LoaderError, Result};
use crate::projection::ProjectionPlan;

/// Pairs `projected_header[i]` with `row[indices[i]]`. Values stay as text.
///
/// `row_number` is the 1-based data row position, reported when the row is
/// too short for the projection.
pub fn transform<S: AsRef<str,>,>(
    row: &[S],
    projected_header: &[String],
    indices: &[usize],
    row_number: u64,
) -> Result<Document,> {
    debug_assert_eq!(projected_header.len(), indices.len());

    let required = indices.iter().max().map_or(0, |&max| max + 1,);
    if row.len() < required {
        return Err(LoaderError::RowShape {
            row:      row_number,
            expected: required,
            actual:   row.len(),
        },);
    }

    let mut document = Document::new();
    for (name, &index,) in projected_header.iter().zip(indices,) {
        document.insert(name.clone(), Bson::String(row[index].as_ref().to_string(),),);
    }
    Ok(document,)
}

/// Convenience wrapper over [`transform`] taking a resolved plan.
pub fn transform_with_plan<S: AsRef<str,>,>(
    row: &[S],
    plan: &ProjectionPlan,
    row_number: u64,
) -> Result<Document,> {
    transform(row, &plan.names, &plan.indices, row_number,)
}
