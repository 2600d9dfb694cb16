//! NVS settings store.
//!
//! Implements [`SettingsStore`]: one JSON blob under a single
//! namespace/key pair.
//!
//! - Namespace isolation: everything this firmware persists lives under
//!   the `picoweather` namespace.
//! - Atomic writes: ESP-IDF NVS commits are atomic per `nvs_commit()`.
//! - The simulation backend is a single in-memory slot (dev/test only).

use log::info;
#[cfg(target_os = "espidf")]
use log::warn;

use crate::app::ports::SettingsStore;
use crate::config::Settings;
use crate::error::ConfigError;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
const NAMESPACE: &str = "picoweather";

#[allow(dead_code)]
const MAX_BLOB_SIZE: usize = 512;

pub struct NvsSettingsStore {
    #[cfg(not(target_os = "espidf"))]
    slot: std::cell::RefCell<Option<Vec<u8>>>,
}

impl NvsSettingsStore {
    /// Create the store and initialise NVS flash.
    ///
    /// On first boot or after an IDF version bump the partition is erased
    /// and re-initialised automatically.
    pub fn new() -> Result<Self, ConfigError> {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: nvs_flash_init / nvs_flash_erase run from the single
            // main-task context before any concurrent NVS access.
            let ret = unsafe { nvs_flash_init() };
            if ret == ESP_ERR_NVS_NO_FREE_PAGES || ret == ESP_ERR_NVS_NEW_VERSION_FOUND {
                warn!("NVS: erasing and re-initialising flash partition");
                if unsafe { nvs_flash_erase() } != ESP_OK {
                    return Err(ConfigError::Io);
                }
                if unsafe { nvs_flash_init() } != ESP_OK {
                    return Err(ConfigError::Io);
                }
            } else if ret != ESP_OK {
                return Err(ConfigError::Io);
            }
            info!("NvsSettingsStore: ESP-IDF NVS initialised");
        }

        #[cfg(not(target_os = "espidf"))]
        info!("NvsSettingsStore: simulation backend");

        Ok(Self {
            #[cfg(not(target_os = "espidf"))]
            slot: std::cell::RefCell::new(None),
        })
    }

    /// Open the namespace, run a closure with the handle, then close.
    #[cfg(target_os = "espidf")]
    fn with_nvs_handle<F, T>(write: bool, f: F) -> Result<T, i32>
    where
        F: FnOnce(nvs_handle_t) -> Result<T, i32>,
    {
        let mut ns_buf = [0u8; 16];
        let ns_bytes = NAMESPACE.as_bytes();
        ns_buf[..ns_bytes.len()].copy_from_slice(ns_bytes);

        let mut handle: nvs_handle_t = 0;
        let mode = if write {
            nvs_open_mode_t_NVS_READWRITE
        } else {
            nvs_open_mode_t_NVS_READONLY
        };

        let ret = unsafe { nvs_open(ns_buf.as_ptr() as *const _, mode, &mut handle) };
        if ret != ESP_OK {
            return Err(ret);
        }

        let result = f(handle);
        unsafe {
            nvs_close(handle);
        }
        result
    }

    fn read_blob(&self) -> Result<Vec<u8>, ConfigError> {
        #[cfg(not(target_os = "espidf"))]
        {
            self.slot.borrow().clone().ok_or(ConfigError::Missing)
        }

        #[cfg(target_os = "espidf")]
        {
            let result = Self::with_nvs_handle(false, |handle| {
                let key_cstr = b"settings\0";
                let mut size: usize = 0;

                // First call sizes the blob.
                let ret = unsafe {
                    nvs_get_blob(
                        handle,
                        key_cstr.as_ptr() as *const _,
                        core::ptr::null_mut(),
                        &mut size,
                    )
                };
                if ret != ESP_OK || size == 0 || size > MAX_BLOB_SIZE {
                    return Err(ret);
                }

                let mut buf = vec![0u8; size];
                let ret = unsafe {
                    nvs_get_blob(
                        handle,
                        key_cstr.as_ptr() as *const _,
                        buf.as_mut_ptr() as *mut _,
                        &mut size,
                    )
                };
                if ret != ESP_OK {
                    return Err(ret);
                }
                Ok(buf)
            });

            match result {
                Ok(bytes) => Ok(bytes),
                // nvs_open on a never-written namespace also reports NOT_FOUND.
                Err(e) if e == ESP_ERR_NVS_NOT_FOUND => Err(ConfigError::Missing),
                Err(e) => {
                    warn!("NVS read error {e}");
                    Err(ConfigError::Io)
                }
            }
        }
    }
}

impl SettingsStore for NvsSettingsStore {
    fn load(&self) -> Result<Settings, ConfigError> {
        let bytes = self.read_blob()?;
        let settings = Settings::from_json(&bytes)?;
        info!("settings loaded ({} bytes)", bytes.len());
        Ok(settings)
    }

    fn save(&mut self, settings: &Settings) -> Result<(), ConfigError> {
        settings.validate()?;
        let bytes = settings.to_json()?;

        #[cfg(not(target_os = "espidf"))]
        {
            *self.slot.borrow_mut() = Some(bytes);
            Ok(())
        }

        #[cfg(target_os = "espidf")]
        {
            let result = Self::with_nvs_handle(true, |handle| {
                let key_cstr = b"settings\0";
                let ret = unsafe {
                    nvs_set_blob(
                        handle,
                        key_cstr.as_ptr() as *const _,
                        bytes.as_ptr() as *const _,
                        bytes.len(),
                    )
                };
                if ret != ESP_OK {
                    return Err(ret);
                }
                let ret = unsafe { nvs_commit(handle) };
                if ret != ESP_OK {
                    return Err(ret);
                }
                Ok(())
            });
            match result {
                Ok(()) => {
                    info!("settings saved to NVS ({} bytes)", bytes.len());
                    Ok(())
                }
                Err(e) => {
                    warn!("NVS write error {e}");
                    Err(ConfigError::Io)
                }
            }
        }
    }

    fn delete(&mut self) -> Result<(), ConfigError> {
        #[cfg(not(target_os = "espidf"))]
        {
            *self.slot.borrow_mut() = None;
            Ok(())
        }

        #[cfg(target_os = "espidf")]
        {
            let result = Self::with_nvs_handle(true, |handle| {
                let key_cstr = b"settings\0";
                let ret = unsafe { nvs_erase_key(handle, key_cstr.as_ptr() as *const _) };
                if ret != ESP_OK && ret != ESP_ERR_NVS_NOT_FOUND {
                    return Err(ret);
                }
                let ret = unsafe { nvs_commit(handle) };
                if ret != ESP_OK {
                    return Err(ret);
                }
                Ok(())
            });
            result.map_err(|e| {
                warn!("NVS erase error {e}");
                ConfigError::Io
            })
        }
    }

    fn exists(&self) -> bool {
        #[cfg(not(target_os = "espidf"))]
        {
            self.slot.borrow().is_some()
        }

        #[cfg(target_os = "espidf")]
        {
            let result = Self::with_nvs_handle(false, |handle| {
                let key_cstr = b"settings\0";
                let ret = unsafe {
                    nvs_find_key(handle, key_cstr.as_ptr() as *const _, core::ptr::null_mut())
                };
                Ok(ret == ESP_OK)
            });
            result.unwrap_or(false)
        }
    }
}
