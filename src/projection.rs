// nc_loader/src/projection.rs
// Column projection: which header columns survive into the stored documents.

use std::collections::HashSet;

use crate::error::{LoaderError, Result};

/// Field selection for a run. Built once and validated at construction.
#[derive(Debug, Clone, PartialEq, Eq, Default,)]
pub enum FieldProjection {
    /// Keep every column in header order.
    #[default]
    All,
    /// Keep only these columns, in this order.
    Include(Vec<String,>,),
    /// Keep every column except these, in header order.
    Exclude(Vec<String,>,),
}

impl FieldProjection {
    /// An empty list on either side means "not set".
    pub fn new(include: Vec<String,>, exclude: Vec<String,>,) -> Result<Self,> {
        match (include.is_empty(), exclude.is_empty(),) {
            (false, false,) => Err(LoaderError::ConfigurationError(
                "projection specifications are mutually exclusive: set either include or exclude"
                    .to_string(),
            ),),
            (true, true,) => Ok(FieldProjection::All,),
            (false, true,) => {
                reject_duplicates("include", &include,)?;
                Ok(FieldProjection::Include(include,),)
            },
            (true, false,) => {
                reject_duplicates("exclude", &exclude,)?;
                Ok(FieldProjection::Exclude(exclude,),)
            },
        }
    }

    pub fn include<I, S,>(fields: I,) -> Result<Self,>
    where
        I: IntoIterator<Item = S,>,
        S: Into<String,>,
    {
        Self::new(fields.into_iter().map(Into::into,).collect(), Vec::new(),)
    }

    pub fn exclude<I, S,>(fields: I,) -> Result<Self,>
    where
        I: IntoIterator<Item = S,>,
        S: Into<String,>,
    {
        Self::new(Vec::new(), fields.into_iter().map(Into::into,).collect(),)
    }

    /// Resolves the projection against a header. Every named field must exist.
    pub fn resolve<S: AsRef<str,>,>(&self, header: &[S],) -> Result<ProjectionPlan,> {
        let indices = match self {
            FieldProjection::All => (0..header.len()).collect(),
            FieldProjection::Include(fields,) => lookup_all(header, fields,)?,
            FieldProjection::Exclude(fields,) => {
                let dropped: HashSet<usize,> = lookup_all(header, fields,)?.into_iter().collect();
                (0..header.len()).filter(|i| !dropped.contains(i,),).collect()
            },
        };
        let names = indices
            .iter()
            .map(|&i| header[i].as_ref().to_string(),)
            .collect();
        Ok(ProjectionPlan { indices, names, },)
    }
}

fn reject_duplicates(kind: &str, fields: &[String],) -> Result<(),> {
    let mut seen = HashSet::new();
    for field in fields {
        if !seen.insert(field.as_str(),) {
            return Err(LoaderError::ConfigurationError(format!(
                "field '{}' is listed more than once in the {} list",
                field, kind
            ),),);
        }
    }
    Ok((),)
}

fn lookup_all<S: AsRef<str,>,>(header: &[S], fields: &[String],) -> Result<Vec<usize,>,> {
    let mut indices = Vec::with_capacity(fields.len(),);
    let mut missing = Vec::new();
    for field in fields {
        match header.iter().position(|h| h.as_ref() == field,) {
            Some(i,) => indices.push(i,),
            None => missing.push(field.clone(),),
        }
    }
    if !missing.is_empty() {
        return Err(LoaderError::FieldNotFound { missing, },);
    }
    Ok(indices,)
}

/// The resolved column selection for one source file.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct ProjectionPlan {
    /// Column positions in the source row, in output order.
    pub indices: Vec<usize,>,
    /// Header names matching `indices`, position for position.
    pub names:   Vec<String,>,
}

/// Resolves header column indices from raw include/exclude lists.
pub fn resolve<S: AsRef<str,>,>(
    header: &[S],
    include: &[String],
    exclude: &[String],
) -> Result<Vec<usize,>,> {
    let projection = FieldProjection::new(include.to_vec(), exclude.to_vec(),)?;
    Ok(projection.resolve(header,)?.indices,)
}
