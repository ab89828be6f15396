use std::io;
use std::path::{Path, PathBuf};
use tracing::trace;

/// カレントディレクトリから上位に向かってマーカーディレクトリを探す
pub struct RootLocator;

impl RootLocator {
    /// `start` から親ディレクトリを順にたどり、`marker` という名前の子ディレクトリを探す
    ///
    /// 親はパス文字列から求めるので、読めないディレクトリがあっても探索は上位へ続く。
    pub fn locate(start: &Path, marker: &str) -> Option<PathBuf> {
        let mut current = Some(start);

        while let Some(directory) = current {
            match Self::find_marker(directory, marker) {
                Ok(Some(found)) => return Some(found),
                Ok(None) => {}
                Err(error) => {
                    trace!("skipping unreadable directory {}: {error}", directory.display());
                }
            }
            current = directory.parent();
        }

        None
    }

    fn find_marker(directory: &Path, marker: &str) -> io::Result<Option<PathBuf>> {
        for entry in std::fs::read_dir(directory)? {
            let entry = entry?;
            if entry.file_name() == marker && entry.file_type()?.is_dir() {
                return Ok(Some(directory.join(marker)));
            }
        }
        Ok(None)
    }
}
