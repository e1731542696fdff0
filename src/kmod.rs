/*
 * This file is part of odroidc-lights.
 *
 * Copyright (C) 2025 odroidc-lights contributors
 *
 * odroidc-lights is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * odroidc-lights is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with odroidc-lights. If not, see <https://www.gnu.org/licenses/>.
 */

use std::ffi::CString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[cfg(test)]
use mockall::automock;

#[derive(Error, Debug)]
pub enum KmodError {
    #[error("loading {module}: {source}")]
    Load {
        module: PathBuf,
        source: io::Error,
    },
    #[error("unloading {module}: {source}")]
    Unload {
        module: String,
        source: io::Error,
    },
    #[error("bad module name: {0:?}")]
    BadName(String),
}

/// Seam for kernel module loading so board bring-up stays testable
/// without root. The real implementation talks to the kernel directly.
#[cfg_attr(test, automock)]
pub trait ModuleLoader: Send + Sync {
    fn load(&self, image: &Path) -> Result<(), KmodError>;
    fn unload(&self, name: &str) -> Result<(), KmodError>;
}

/// Loads module images with the raw init_module(2)/delete_module(2)
/// syscalls, the same path the board's init scripts use.
#[derive(Debug, Default)]
pub struct SysLoader;

impl ModuleLoader for SysLoader {
    fn load(&self, image: &Path) -> Result<(), KmodError> {
        let bytes = fs::read(image).map_err(|source| KmodError::Load {
            module: image.to_path_buf(),
            source,
        })?;
        let rc = unsafe {
            libc::syscall(
                libc::SYS_init_module,
                bytes.as_ptr() as *const libc::c_void,
                bytes.len() as libc::c_ulong,
                c"".as_ptr(),
            )
        };
        if rc != 0 {
            return Err(KmodError::Load {
                module: image.to_path_buf(),
                source: io::Error::last_os_error(),
            });
        }
        Ok(())
    }

    fn unload(&self, name: &str) -> Result<(), KmodError> {
        let cname = CString::new(name).map_err(|_| KmodError::BadName(name.to_string()))?;
        // O_NONBLOCK: fail instead of waiting for the module's refcount.
        let rc = unsafe {
            libc::syscall(
                libc::SYS_delete_module,
                cname.as_ptr(),
                libc::O_NONBLOCK as libc::c_long,
            )
        };
        if rc != 0 {
            return Err(KmodError::Unload {
                module: name.to_string(),
                source: io::Error::last_os_error(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_image_is_io_error() {
        let dir = TempDir::new().unwrap();
        let image = dir.path().join("pwm-meson.ko");
        let err = SysLoader.load(&image).unwrap_err();
        match err {
            KmodError::Load { module, source } => {
                assert_eq!(module, image);
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_unload_rejects_embedded_nul() {
        let err = SysLoader.unload("pwm\0ctrl").unwrap_err();
        match err {
            KmodError::BadName(name) => assert_eq!(name, "pwm\0ctrl"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_error_messages_name_the_module() {
        let err = KmodError::Unload {
            module: "pwm-ctrl".to_string(),
            source: io::Error::from_raw_os_error(libc::EBUSY),
        };
        assert!(err.to_string().contains("pwm-ctrl"));
    }

    #[test]
    fn test_mock_loader_expectations() {
        let mut mock = MockModuleLoader::new();
        mock.expect_load().times(1).returning(|_| Ok(()));
        mock.expect_unload()
            .times(1)
            .returning(|name| {
                Err(KmodError::Unload {
                    module: name.to_string(),
                    source: io::Error::from_raw_os_error(libc::EBUSY),
                })
            });
        assert!(mock.load(Path::new("mod.ko")).is_ok());
        assert!(mock.unload("mod").is_err());
    }
}
