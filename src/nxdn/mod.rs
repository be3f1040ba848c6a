//! Frame families of the NXDN air interface: control-channel messages and
//! the site data they broadcast.

pub mod rcch;
pub mod site;
