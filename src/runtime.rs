// C runtime library linked into every program
//
// Generated code includes RUNTIME_HEADER and relies on String__make,
// int_array_make and int_array_push from these sources. The files are
// compiled into the binary and written next to the generated unit at
// build time.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const RUNTIME_HEADER: &str = "runtime.h";

pub struct RuntimeFile {
    pub name: &'static str,
    pub contents: &'static str,
}

impl RuntimeFile {
    pub fn is_source(&self) -> bool {
        self.name.ends_with(".c")
    }
}

pub const RUNTIME_FILES: &[RuntimeFile] = &[
    RuntimeFile {
        name: RUNTIME_HEADER,
        contents: include_str!("../runtime/runtime.h"),
    },
    RuntimeFile {
        name: "string.c",
        contents: include_str!("../runtime/string.c"),
    },
    RuntimeFile {
        name: "array.c",
        contents: include_str!("../runtime/array.c"),
    },
];

/// Write the runtime into `dir`, returning the paths of the `.c` files to compile
pub fn write_to(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut sources = Vec::new();
    for file in RUNTIME_FILES {
        let path = dir.join(file.name);
        fs::write(&path, file.contents)?;
        if file.is_source() {
            sources.push(path);
        }
    }
    Ok(sources)
}
