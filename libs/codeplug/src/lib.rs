//! Codeplug codecs for the RT-5D / JJCC-888DMR.
//!
//! Three layers live here, leaf to root:
//!
//! * field primitives ([`fields`], [`subaudio`]): frequencies, DMR IDs,
//!   GB2312 text, nibble-indexed digit strings, CTCSS/DCS;
//! * block codecs ([`channel`], [`contact`], [`group`], [`dtmf`], [`keys`],
//!   [`settings`], [`vfo`], [`info`]) plus the packet fan-out in [`pack`];
//! * the [`document`] binding between [`SessionPayloads`] and the JSON
//!   document users edit.
//!
//! Binary decoders are tolerant: out-of-range discriminants fall back to
//! the documented default and short buffers read as `0xFF`. Validation of
//! user input happens once, in the document binding, which is the only
//! fallible path.

use thiserror::Error;

macro_rules! doc_enum {
    (@first $head:path $(, $rest:path)*) => { $head };
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $raw:literal => $label:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// First variant is the documented default.
            pub const DEFAULT: Self = doc_enum!(@first $( $name::$variant ),+);

            pub fn from_raw(raw: u8) -> Option<Self> {
                match raw {
                    $( $raw => Some(Self::$variant), )+
                    _ => None,
                }
            }

            pub fn raw(self) -> u8 {
                match self { $( Self::$variant => $raw ),+ }
            }

            pub fn name(self) -> &'static str {
                match self { $( Self::$variant => $label ),+ }
            }

            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $( $label => Some(Self::$variant), )+
                    _ => None,
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::DEFAULT
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
                s.serialize_str(self.name())
            }
        }

        // Unknown names deserialize to the default so documents written by
        // newer tool versions stay loadable.
        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
                let s = <String as serde::Deserialize>::deserialize(d)?;
                Ok(Self::from_name(&s).unwrap_or_default())
            }
        }
    };
}

pub(crate) use doc_enum;

pub mod channel;
pub mod contact;
pub mod document;
pub mod dtmf;
pub mod fields;
pub mod group;
pub mod info;
pub mod keys;
pub mod pack;
pub mod settings;
pub mod subaudio;
pub mod vfo;

pub use document::ConfigDocument;

pub const VERSION_LEN: usize = 128;
pub const DTMF_LEN: usize = 272;
pub const KEYS_LEN: usize = 264;
pub const VFO_LEN: usize = 128;
pub const SETTINGS_LEN: usize = 64;
pub const INFO_LEN: usize = 64;

pub const CONTACT_PACKETS: usize = 80;
pub const CONTACT_PACKET_LEN: usize = 800;
pub const CONTACTS_PER_PACKET: usize = 50;
pub const GROUP_PACKETS: usize = 4;
pub const GROUP_PACKET_LEN: usize = 1024;
pub const GROUPS_PER_PACKET: usize = 8;
pub const CHANNEL_PACKETS: usize = 64;
pub const CHANNEL_PACKET_LEN: usize = 1024;
pub const CHANNELS_PER_PACKET: usize = 16;

pub const MAX_CHANNELS: usize = 1024;
pub const MAX_CONTACTS: usize = 4000;
pub const MAX_GROUPS: usize = 32;
pub const MAX_KEYS: usize = 8;

/// A problem in the user-supplied document, reported with the offending
/// field path.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("{path}: name does not fit in {max} bytes of GB2312")]
    NameTooLong { path: String, max: usize },
    #[error("{path}: `{value}` cannot be encoded as GB2312")]
    Unencodable { path: String, value: String },
    #[error("{path}: invalid frequency `{value}` (expected MHz with up to six decimals)")]
    BadFrequency { path: String, value: String },
    #[error("{path}: invalid sub-audio `{value}` (expected OFF, `CTCSS <Hz>` or Dnnn[NI])")]
    BadSubAudio { path: String, value: String },
    #[error("{path}: invalid digit string `{value}` (alphabet `{alphabet}`, max {max} digits)")]
    BadDigits {
        path: String,
        value: String,
        alphabet: &'static str,
        max: usize,
    },
    #[error("{path}: invalid hex key `{value}` (up to {max} hex digits)")]
    BadHexKey { path: String, value: String, max: usize },
    #[error("{path}: call ID {id} out of range 1..=16777215")]
    BadCallId { path: String, id: u32 },
    #[error("{path}: invalid FHSS code `{value}` (expected six hex digits)")]
    BadFhss { path: String, value: String },
}

/// Raw bytes of every codeplug block, sized exactly as the session moves
/// them. This is the hand-off between the wire layer and the codecs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionPayloads {
    /// Version block from step 3. Informational; never written back.
    pub version: Vec<u8>,
    pub dtmf: Vec<u8>,
    pub keys: Vec<u8>,
    pub contacts: Vec<Vec<u8>>,
    pub groups: Vec<Vec<u8>>,
    pub channels: Vec<Vec<u8>>,
    pub vfo: Vec<u8>,
    pub settings: Vec<u8>,
    pub info: Vec<u8>,
}

impl SessionPayloads {
    /// All blocks at their exact sizes, filled with the erased-flash
    /// pattern `0xFF`.
    pub fn filled() -> Self {
        Self {
            version: vec![0xFF; VERSION_LEN],
            dtmf: vec![0xFF; DTMF_LEN],
            keys: vec![0xFF; KEYS_LEN],
            contacts: vec![vec![0xFF; CONTACT_PACKET_LEN]; CONTACT_PACKETS],
            groups: vec![vec![0xFF; GROUP_PACKET_LEN]; GROUP_PACKETS],
            channels: vec![vec![0xFF; CHANNEL_PACKET_LEN]; CHANNEL_PACKETS],
            vfo: vec![0xFF; VFO_LEN],
            settings: vec![0xFF; SETTINGS_LEN],
            info: vec![0xFF; INFO_LEN],
        }
    }
}

impl Default for SessionPayloads {
    fn default() -> Self {
        Self::filled()
    }
}

/// The symbolic codeplug. Slot `k` in the document is index `k - 1` here.
#[derive(Debug, Clone, PartialEq)]
pub struct Codeplug {
    pub info: info::RadioInfo,
    pub dtmf: dtmf::Dtmf,
    pub keys: Vec<Option<keys::EncryptionKey>>,
    pub contacts: Vec<Option<contact::Contact>>,
    pub groups: Vec<Option<group::RxGroup>>,
    pub channels: Vec<Option<channel::Channel>>,
    pub vfo: vfo::VfoBanks,
    pub settings: settings::Settings,
}

impl Default for Codeplug {
    fn default() -> Self {
        Self {
            info: info::RadioInfo::default(),
            dtmf: dtmf::Dtmf::default(),
            keys: vec![None; MAX_KEYS],
            contacts: vec![None; MAX_CONTACTS],
            groups: vec![None; MAX_GROUPS],
            channels: vec![None; MAX_CHANNELS],
            vfo: vfo::VfoBanks::default(),
            settings: settings::Settings::default(),
        }
    }
}

impl Codeplug {
    /// Decode every block of a completed read session. Tolerant by design;
    /// whatever the radio sent becomes the nearest representable model.
    pub fn from_payloads(p: &SessionPayloads) -> Self {
        Self {
            info: info::decode(&p.info),
            dtmf: dtmf::decode(&p.dtmf),
            keys: keys::decode_block(&p.keys),
            contacts: pack::unpack(
                &p.contacts,
                CONTACTS_PER_PACKET,
                contact::RECORD_LEN,
                contact::decode,
            ),
            groups: pack::unpack(&p.groups, GROUPS_PER_PACKET, group::RECORD_LEN, group::decode),
            channels: pack::unpack(
                &p.channels,
                CHANNELS_PER_PACKET,
                channel::RECORD_LEN,
                channel::decode,
            ),
            vfo: vfo::decode_banks(&p.vfo),
            settings: settings::decode(&p.settings),
        }
    }

    /// Encode every block back into transfer-sized buffers. The version
    /// block stays `0xFF`; it is never written to the radio.
    pub fn to_payloads(&self) -> SessionPayloads {
        SessionPayloads {
            version: vec![0xFF; VERSION_LEN],
            dtmf: dtmf::encode(&self.dtmf),
            keys: keys::encode_block(&self.keys),
            contacts: pack::pack(
                &self.contacts,
                CONTACT_PACKETS,
                CONTACTS_PER_PACKET,
                contact::RECORD_LEN,
                contact::encode,
            ),
            groups: pack::pack(
                &self.groups,
                GROUP_PACKETS,
                GROUPS_PER_PACKET,
                group::RECORD_LEN,
                group::encode,
            ),
            channels: pack::pack(
                &self.channels,
                CHANNEL_PACKETS,
                CHANNELS_PER_PACKET,
                channel::RECORD_LEN,
                channel::encode,
            ),
            vfo: vfo::encode_banks(&self.vfo),
            settings: settings::encode(&self.settings),
            info: info::encode(&self.info),
        }
    }
}
