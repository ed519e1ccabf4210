//! Static file access: turning an untrusted target into a path, and
//! streaming file contents in bounded chunks.

use std::fmt;
use std::io;
use std::path::{Component, Path, PathBuf};

use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Default size of one body chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// The target contains a `..` component.
    Traversal(String),
    /// The target names an absolute path once its leading `/` is removed.
    Absolute(String),
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathError::Traversal(t) => write!(f, "target escapes document root: {}", t),
            PathError::Absolute(t) => write!(f, "target is an absolute path: {}", t),
        }
    }
}

impl std::error::Error for PathError {}

/// Builds the filesystem path for a request target.
///
/// One leading `/` is stripped and the remainder is joined onto `root`. When
/// `confine` is set, targets that could leave `root` are rejected; otherwise
/// the target is used as-is. On Unix the target's bytes become the path
/// unchanged, so filenames that are not UTF-8 can still be served.
pub fn resolve_path(
    root: &Path,
    target: impl AsRef<[u8]>,
    confine: bool,
) -> Result<PathBuf, PathError> {
    let target = target.as_ref();
    let stripped = target.strip_prefix(b"/").unwrap_or(target);
    let relative = bytes_to_path(stripped);

    if confine {
        for component in relative.components() {
            match component {
                Component::ParentDir => return Err(PathError::Traversal(lossy(target))),
                Component::RootDir | Component::Prefix(_) => {
                    return Err(PathError::Absolute(lossy(target)));
                }
                Component::CurDir | Component::Normal(_) => {}
            }
        }
    }

    Ok(root.join(relative))
}

#[cfg(unix)]
fn bytes_to_path(bytes: &[u8]) -> PathBuf {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    PathBuf::from(OsStr::from_bytes(bytes))
}

// Elsewhere paths are not arbitrary bytes; invalid sequences become U+FFFD
// and simply fail to open.
#[cfg(not(unix))]
fn bytes_to_path(bytes: &[u8]) -> PathBuf {
    PathBuf::from(String::from_utf8_lossy(bytes).into_owned())
}

fn lossy(target: &[u8]) -> String {
    String::from_utf8_lossy(target).into_owned()
}

/// An open file plus the size it had when opened.
#[derive(Debug)]
pub struct StaticFile {
    file: File,
    len: u64,
    path: PathBuf,
}

impl StaticFile {
    /// Opens `path` for reading and records its length from metadata.
    ///
    /// Directories and other non-regular files are refused.
    pub async fn open(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let file = File::open(&path).await?;
        let metadata = file.metadata().await?;

        if !metadata.is_file() {
            return Err(io::Error::other(format!(
                "{} is not a regular file",
                path.display()
            )));
        }

        Ok(Self {
            file,
            len: metadata.len(),
            path,
        })
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Copies the file to `sink` one chunk at a time and returns the number
    /// of bytes written.
    ///
    /// Each chunk is filled as far as the file allows before it is written.
    /// A chunk shorter than `chunk_size` marks end of file, so a file whose
    /// size is an exact multiple of `chunk_size` ends on an empty fill that
    /// writes nothing.
    pub async fn stream_to<W>(&mut self, sink: &mut W, chunk_size: usize) -> io::Result<u64>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let mut chunk = vec![0u8; chunk_size.max(1)];
        let mut sent = 0u64;

        loop {
            let n = fill(&mut self.file, &mut chunk).await?;

            if n > 0 {
                sink.write_all(&chunk[..n]).await?;
                sent += n as u64;
            }

            if n < chunk.len() {
                break;
            }
        }

        sink.flush().await?;
        Ok(sent)
    }
}

/// Reads until `buf` is full or the reader is exhausted.
async fn fill<R>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut filled = 0;

    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }

    Ok(filled)
}
