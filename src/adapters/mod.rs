//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter   | Implements          | Connects to                  |
//! |-----------|---------------------|------------------------------|
//! | `http`    | HttpPort            | EspHttpConnection (TLS)      |
//! | `wifi`    | ConnectivityPort    | ESP-IDF WiFi STA / AP        |
//! | `sntp`    | TimeSyncPort        | lwIP SNTP                    |
//! | `storage` | SettingsStore       | NVS / in-memory slot         |
//! | `display` | DisplayPort         | SSD1306 OLED / frame recorder|
//! | `portal`  | ProvisioningPortal  | EspHttpServer (captive AP)   |
//! |           | UpdatePortal        | EspHttpServer (update page)  |
//! | `time`    | ClockPort           | system clock / esp timer     |
//! | `system`  | RestartPort         | esp_restart / recorded flag  |

pub mod display;
pub mod http;
pub mod portal;
pub mod sntp;
pub mod storage;
pub mod system;
pub mod time;
pub mod wifi;
