//! Service descriptor path rewriting
//!
//! The shipped compose file references its bind and config subtrees with
//! relative paths so the source tree works from a checkout. After staging,
//! the installer pins those two patterns to the deployment root so the stack
//! can be operated from any working directory. Nothing else in the
//! descriptor is touched.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::{Result, StackError};
use crate::layout::{DeploymentLayout, BINDS_DIR, CONFIG_DIR};

/// The two relative patterns the descriptor is allowed to use.
const RELATIVE_PATTERNS: [(&str, &str); 2] =
    [("./monitoring-binds/", BINDS_DIR), ("./config/", CONFIG_DIR)];

/// Rewrite every relative bind/config reference in the staged descriptor to
/// its absolute target-rooted equivalent.
pub fn rewrite_paths(layout: &DeploymentLayout) -> Result<()> {
    let descriptor = layout.descriptor();
    if !descriptor.is_file() {
        return Err(StackError::DescriptorNotFound(descriptor));
    }

    let contents =
        fs::read_to_string(&descriptor).map_err(|e| StackError::io(&descriptor, e))?;
    let rewritten = substitute(&contents, layout.root());

    if rewritten != contents {
        fs::write(&descriptor, rewritten).map_err(|e| StackError::io(&descriptor, e))?;
        info!(descriptor = %descriptor.display(), "rewrote relative paths in descriptor");
    }
    Ok(())
}

fn substitute(contents: &str, root: &Path) -> String {
    let mut out = contents.to_string();
    for (pattern, subtree) in RELATIVE_PATTERNS {
        let absolute = format!("{}/{}/", root.display(), subtree);
        out = out.replace(pattern, &absolute);
    }
    out
}
