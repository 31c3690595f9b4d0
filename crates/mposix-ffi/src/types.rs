//! C types of the host runtime's external-call interface.

#![allow(non_camel_case_types)]

use std::os::raw::{c_char, c_int, c_long, c_uint, c_ulong};

pub type gtm_status_t = c_int;
pub type gtm_int_t = c_int;
pub type gtm_uint_t = c_uint;
pub type gtm_long_t = c_long;
pub type gtm_ulong_t = c_ulong;
pub type gtm_char_t = c_char;
