//! Pulls every plugin crate into the final binary so each plugin's
//! `#[distributed_slice(PLUGIN_FACTORIES)]` entry is linked in. The
//! registry discovers plugins by name at runtime, not by type, so nothing
//! here references a plugin crate's public items directly — the `as _`
//! imports exist purely for their link-time registration side effect.

use controller_button as _;
use processor_ais_decoder as _;
use renderer_image as _;
use screen_table as _;
use screen_zone as _;
use source_mock as _;
use source_serial as _;
