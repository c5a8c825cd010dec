use std::{
    fs::File,
    io::Read,
    path::{Path, PathBuf},
    rc::Rc,
};

/// `Source` represents a Wave program as written.
/// Whether an inline snippet or a file on disk, it is essentially a
/// string with a path, the path serving as the source's name.
/// Sources without a path point to `./source`.
///
/// Sources are shared behind an `Rc` so every `Span` handed out
/// during compilation can keep a cheap reference to the text it
/// annotates.
#[derive(Debug, PartialEq, Eq)]
pub struct Source {
    pub contents: String,
    pub path: PathBuf,
}

impl Source {
    /// Creates a new `Source` from contents and a path.
    /// This does not touch the filesystem; use `Source::path` to read
    /// a file, or `Source::source` for an inline snippet.
    pub fn new(source: &str, path: &Path) -> Rc<Source> {
        Rc::new(Source {
            contents: source.to_string(),
            path: path.to_owned(),
        })
    }

    /// Builds a `Source` by reading a file.
    pub fn path(path: &Path) -> std::io::Result<Rc<Source>> {
        let mut contents = String::new();
        let mut file = File::open(path)?;
        file.read_to_string(&mut contents)?;

        Ok(Source::new(&contents, path))
    }

    /// Builds a `Source` holding just a string, pointing to
    /// `./source`.
    pub fn source(source: &str) -> Rc<Source> {
        Source::new(source, &PathBuf::from("./source"))
    }
}
