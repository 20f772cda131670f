//! One run of the tool: merge, select, launch.

use tracing::info;

use crate::{
    docset::Docset,
    error::{Error, Result},
    index::MergedIndex,
    launcher::{self, Target, Viewer},
    selector::{self, Selection, Selector},
};

/// How a run ended, when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The viewer was started on this target.
    Opened(Target),
    /// The user backed out of the finder.
    Cancelled,
    /// The filter left nothing to choose from.
    NoCandidates,
}

/// Build the merged index, let the user choose, and open the choice.
///
/// `filter` narrows the rows handed to the selector. The selector is only
/// consulted once at least one docset loaded, and the viewer only once the
/// chosen entry resolved to an existing file.
pub fn run(
    docsets: &[Docset],
    filter: Option<&str>,
    selector: &mut dyn Selector,
    viewer: &dyn Viewer,
) -> Result<Outcome> {
    let index = MergedIndex::build(docsets)?;
    let rows = index.filter(filter.unwrap_or_default());
    if rows.is_empty() {
        return Ok(Outcome::NoCandidates);
    }

    let row = match selector::select(&index, &rows, selector)? {
        Selection::Chosen(row) => row,
        Selection::Cancelled => {
            info!("selection cancelled");
            return Ok(Outcome::Cancelled);
        }
    };

    let entry = index.get(row).ok_or_else(|| {
        Error::Finder(format!("selected row {row} is out of range"))
    })?;
    let target = launcher::resolve(index.docset_of(entry), entry)?;
    viewer.open(&target)?;

    Ok(Outcome::Opened(target))
}
