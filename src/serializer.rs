//! Output of generated WSDL documents.
//!
//! Documents are rendered as indented XML text and either written to a file or
//! handed back as a response body with the `text/xml` content type.

use crate::error;
use crate::wsdl::Wsdl;
use anyhow::{Context, Result};
use log::debug;
use std::fs;
use std::path::Path;

/// Content type of served WSDL documents
pub const WSDL_CONTENT_TYPE: &str = "text/xml";

/// A document ready to be sent to a client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServedDocument {
    pub content_type: &'static str,
    pub body: String,
}

/// Renders a WSDL document to XML text.
///
/// The output starts with an XML declaration and uses two-space indentation.
pub fn to_xml(wsdl: &Wsdl) -> error::Result<String> {
    debug!("Serializing WSDL document {} to XML", wsdl.name());
    wsdl.to_xml()
}

/// Wraps the rendered document in a `text/xml` response without further processing
pub fn serve(wsdl: &Wsdl) -> error::Result<ServedDocument> {
    Ok(ServedDocument {
        content_type: WSDL_CONTENT_TYPE,
        body: to_xml(wsdl)?,
    })
}

/// Writes string content to a file.
///
/// Creates the file if it doesn't exist, or overwrites it if it does.
/// Missing parent directories are created first.
///
/// # Errors
///
/// Returns an error if a directory or the file cannot be written.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    debug!("Writing content to file: {}", path.display());

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(path, content)
        .with_context(|| format!("Failed to write to file: {}", path.display()))?;

    debug!("Successfully wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}
