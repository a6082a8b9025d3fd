use std::collections::BTreeMap;
use std::env;
use std::path::PathBuf;
use std::sync::{PoisonError, RwLock};
use std::time::SystemTime;

use toml_edit::{Document, Item, Table};

/// The invoking crate's `Cargo.toml`, used to spell paths to weft crates.
///
/// Generated code must name `weft_codec` the way the calling crate sees it:
///
/// 1. `weft_codec` is a direct dependency: `::weft_codec`.
/// 2. The facade crate `weft` is a dependency: `::weft::codec`
///    (the `weft_` prefix is stripped from the requested name).
/// 3. Both rules are retried against `dev-dependencies`.
/// 4. Otherwise `::weft_codec` is assumed. Crates that expand the macro on
///    themselves add `extern crate self as weft_codec;`.
///
/// ```rust
/// # use weft_macro_utils::Manifest;
/// let path: syn::Path = Manifest::shared(|m| m.crate_path("weft_codec"));
/// ```
///
/// Reading the manifest is not free, so callers resolve a path once per macro
/// invocation and pass it around.
#[derive(Debug)]
pub struct Manifest {
    document: Document<Box<str>>,
    modified: SystemTime,
}

const FACADE: &str = "weft";
const PREFIX: &str = "weft_";

impl Manifest {
    fn manifest_path() -> PathBuf {
        let dir = env::var_os("CARGO_MANIFEST_DIR")
            .expect("CARGO_MANIFEST_DIR should be defined by cargo");
        let mut path = PathBuf::from(dir);
        path.push("Cargo.toml");
        path
    }

    fn load(path: &PathBuf, modified: SystemTime) -> Self {
        let text = std::fs::read_to_string(path)
            .unwrap_or_else(|_| panic!("unable to read cargo manifest: {}", path.display()));
        let document = Document::parse(text.into_boxed_str())
            .unwrap_or_else(|_| panic!("failed to parse cargo manifest: {}", path.display()));
        Self { document, modified }
    }

    fn lookup(deps: &Table, name: &str) -> Option<syn::Path> {
        if deps.contains_key(name) {
            return Some(parse_path(&format!("::{name}")));
        }
        let module = name.strip_prefix(PREFIX)?;
        deps.contains_key(FACADE)
            .then(|| parse_path(&format!("::{FACADE}::{module}")))
    }

    /// Path of the crate `name` as seen from the invoking crate.
    pub fn crate_path(&self, name: &str) -> syn::Path {
        ["dependencies", "dev-dependencies"]
            .into_iter()
            .filter_map(|section| match self.document.get(section) {
                Some(Item::Table(deps)) => Self::lookup(deps, name),
                _ => None,
            })
            .next()
            .unwrap_or_else(|| parse_path(&format!("::{name}")))
    }

    /// Runs `func` against the cached manifest of the invoking crate.
    ///
    /// The cache is keyed by manifest path and refreshed when the file changes.
    pub fn shared<R>(func: impl FnOnce(&Self) -> R) -> R {
        static MANIFESTS: RwLock<BTreeMap<PathBuf, Manifest>> = RwLock::new(BTreeMap::new());

        let path = Self::manifest_path();
        let modified = std::fs::metadata(&path)
            .and_then(|meta| meta.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH);

        {
            let cache = MANIFESTS.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(manifest) = cache.get(&path)
                && manifest.modified == modified
            {
                return func(manifest);
            }
        }

        let manifest = Self::load(&path, modified);
        let result = func(&manifest);
        MANIFESTS
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path, manifest);
        result
    }
}

fn parse_path(text: &str) -> syn::Path {
    syn::parse_str(text).unwrap_or_else(|_| panic!("`{text}` is not a valid path"))
}
