//! Output file handling.

use super::*;

/// A validated CSV destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
  /// Path ending in `.csv`
  pub path:    PathBuf,
  /// Whether writing will replace an existing file
  pub existed: bool,
}

/// Normalizes a user-supplied output path and checks it can be written.
///
/// A `.csv` extension is appended unless already present. The parent directory must exist;
/// it is never created.
pub fn prepare(path: &Path) -> Result<OutputFile> {
  let path = with_csv_extension(path);

  if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
    if !parent.is_dir() {
      return Err(CliError::Input(format!(
        "Output directory {} does not exist",
        parent.display()
      )));
    }
  }
  if path.is_dir() {
    return Err(CliError::Input(format!("{} is a directory", path.display())));
  }

  let existed = path.exists();
  Ok(OutputFile { path, existed })
}

fn with_csv_extension(path: &Path) -> PathBuf {
  let is_csv =
    path.extension().and_then(|extension| extension.to_str()).is_some_and(|extension| {
      extension.eq_ignore_ascii_case("csv")
    });
  if is_csv {
    path.to_path_buf()
  } else {
    let mut name = path.as_os_str().to_owned();
    name.push(".csv");
    PathBuf::from(name)
  }
}
