//! Binding between the symbolic [`Codeplug`] and the JSON document users
//! edit and keep under version control.
//!
//! The document is the authoritative user-facing form: frequencies as
//! decimal MHz strings, sub-audio as `OFF` / `CTCSS 88.5` / `D023N`,
//! enumerations by name, empty slots omitted, populated entries carrying
//! an explicit 1-based slot. Serialization is canonical (fixed field
//! order, defaults omitted), so writing a document, programming it and
//! reading it back reproduces the same bytes on disk.
//!
//! Loading is forgiving where old documents must stay loadable: unknown
//! enumeration names fall back to their defaults, slot numbers clamp into
//! range and missing sections become default blocks. Malformed
//! frequencies, digit strings and hex keys are hard errors that name the
//! offending field.

use serde::{Deserialize, Serialize};

use crate::channel::{self, Bandwidth, Channel, ChannelKind, Power, TimeSlot};
use crate::contact::{self, CallType, Contact};
use crate::dtmf::{Dtmf, DtmfTiming, PttId, MAX_CODE_GROUPS, MAX_GROUP_DIGITS, MAX_ID_DIGITS};
use crate::fields::{format_mhz, gb2312_len, parse_mhz, valid_digits, DTMF_ALPHABET};
use crate::group::{RxGroup, MAX_MEMBERS};
use crate::info::{RadioInfo, MAX_MODEL_ID};
use crate::keys::{EncryptionKey, KeyAlgorithm};
use crate::settings::Settings;
use crate::subaudio::SubAudio;
use crate::vfo::{VfoBank, VfoBanks, VfoStep, BANK_A_DEFAULT_FREQ, BANK_B_DEFAULT_FREQ};
use crate::{
    contact::MAX_CALL_ID, Codeplug, CodecError, MAX_CHANNELS, MAX_CONTACTS, MAX_GROUPS, MAX_KEYS,
};

fn is_false(v: &bool) -> bool {
    !*v
}

fn is_zero(v: &u8) -> bool {
    *v == 0
}

fn is_default<T: Default + PartialEq>(v: &T) -> bool {
    *v == T::default()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radio: Option<RadioDoc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dtmf: Option<DtmfDoc>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub encryption_keys: Vec<KeyDoc>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub contacts: Vec<ContactDoc>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rx_groups: Vec<GroupDoc>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub channels: Vec<ChannelDoc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vfo: Option<VfoDoc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<Settings>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RadioDoc {
    pub model_name: String,
    pub model_id: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DtmfDoc {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub current_id: String,
    #[serde(skip_serializing_if = "is_default")]
    pub ptt_id: PttId,
    #[serde(skip_serializing_if = "is_default")]
    pub duration: DtmfTiming,
    #[serde(skip_serializing_if = "is_default")]
    pub interval: DtmfTiming,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub code_groups: Vec<DtmfGroupDoc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DtmfGroupDoc {
    pub slot: u8,
    pub code: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KeyDoc {
    pub slot: u8,
    pub algorithm: KeyAlgorithm,
    pub key: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactDoc {
    pub slot: u16,
    pub call_type: CallType,
    pub call_id: u32,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GroupDoc {
    pub slot: u8,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    pub members: Vec<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChannelDoc {
    pub slot: u16,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "is_default")]
    pub kind: ChannelKind,
    pub rx_freq: String,
    pub tx_freq: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rx_sub_audio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_sub_audio: Option<String>,
    #[serde(skip_serializing_if = "is_default")]
    pub power: Power,
    #[serde(skip_serializing_if = "is_default")]
    pub bandwidth: Bandwidth,
    #[serde(skip_serializing_if = "is_zero")]
    pub color_code: u8,
    #[serde(skip_serializing_if = "is_default")]
    pub time_slot: TimeSlot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rx_group: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encryption_key: Option<u8>,
    #[serde(skip_serializing_if = "is_false")]
    pub learn_fhss: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub scan_add: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fhss: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VfoDoc {
    pub a: VfoBankDoc,
    pub b: VfoBankDoc,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VfoBankDoc {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rx_freq: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_freq: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rx_sub_audio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_sub_audio: Option<String>,
    #[serde(skip_serializing_if = "is_default")]
    pub kind: ChannelKind,
    #[serde(skip_serializing_if = "is_default")]
    pub power: Power,
    #[serde(skip_serializing_if = "is_default")]
    pub bandwidth: Bandwidth,
    #[serde(skip_serializing_if = "is_zero")]
    pub color_code: u8,
    #[serde(skip_serializing_if = "is_default")]
    pub time_slot: TimeSlot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rx_group: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encryption_key: Option<u8>,
    #[serde(skip_serializing_if = "is_default")]
    pub step: VfoStep,
}

fn check_name(name: &str, max: usize, path: &str) -> Result<(), CodecError> {
    match gb2312_len(name) {
        None => Err(CodecError::Unencodable {
            path: path.to_string(),
            value: name.to_string(),
        }),
        Some(n) if n > max => Err(CodecError::NameTooLong {
            path: path.to_string(),
            max,
        }),
        _ => Ok(()),
    }
}

fn parse_freq(s: &str, path: &str) -> Result<u32, CodecError> {
    parse_mhz(s).ok_or_else(|| CodecError::BadFrequency {
        path: path.to_string(),
        value: s.to_string(),
    })
}

fn parse_sub_audio(s: &Option<String>, path: &str) -> Result<SubAudio, CodecError> {
    match s {
        None => Ok(SubAudio::Off),
        Some(s) => SubAudio::parse(s).ok_or_else(|| CodecError::BadSubAudio {
            path: path.to_string(),
            value: s.clone(),
        }),
    }
}

fn render_sub_audio(v: SubAudio) -> Option<String> {
    match v {
        SubAudio::Off => None,
        other => Some(other.to_string()),
    }
}

fn check_digits(
    s: &str,
    max: usize,
    path: &str,
) -> Result<(), CodecError> {
    if s.len() > max || !valid_digits(s, DTMF_ALPHABET) {
        return Err(CodecError::BadDigits {
            path: path.to_string(),
            value: s.to_string(),
            alphabet: DTMF_ALPHABET,
            max,
        });
    }
    Ok(())
}

/// Normalize a hex key: validate, uppercase, zero-pad on the right up to
/// the algorithm's digit budget.
fn normalize_key(key: &str, algorithm: KeyAlgorithm, path: &str) -> Result<String, CodecError> {
    let digits = algorithm.digits();
    if key.len() > digits || !key.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(CodecError::BadHexKey {
            path: path.to_string(),
            value: key.to_string(),
            max: digits,
        });
    }
    let mut out = key.to_ascii_uppercase();
    while out.len() < digits {
        out.push('0');
    }
    Ok(out)
}

fn check_call_id(id: u32, path: &str) -> Result<(), CodecError> {
    if id == 0 || id > MAX_CALL_ID {
        return Err(CodecError::BadCallId {
            path: path.to_string(),
            id,
        });
    }
    Ok(())
}

fn normalize_fhss(code: &Option<String>, path: &str) -> Result<Option<String>, CodecError> {
    match code {
        None => Ok(None),
        Some(code) => {
            if code.len() != 6 || !code.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(CodecError::BadFhss {
                    path: path.to_string(),
                    value: code.clone(),
                });
            }
            Ok(Some(code.to_ascii_uppercase()))
        }
    }
}

/// 1-based document slot → 0-based index, clamped into range.
fn slot_index(slot: usize, max: usize) -> usize {
    slot.clamp(1, max) - 1
}

fn clamp_ref(slot: Option<u16>, max: usize) -> Option<u16> {
    slot.map(|s| s.clamp(1, max as u16))
}

impl ConfigDocument {
    pub fn from_codeplug(cp: &Codeplug) -> Self {
        let channels = cp
            .channels
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|ch| channel_doc(i + 1, ch)))
            .collect();
        let contacts = cp
            .contacts
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| {
                slot.as_ref().map(|c| ContactDoc {
                    slot: (i + 1) as u16,
                    call_type: c.call_type,
                    call_id: c.id,
                    name: c.name.clone(),
                })
            })
            .collect();
        let rx_groups = cp
            .groups
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| {
                slot.as_ref().map(|g| GroupDoc {
                    slot: (i + 1) as u8,
                    name: g.name.clone(),
                    members: g.members.clone(),
                })
            })
            .collect();
        let encryption_keys = cp
            .keys
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| {
                slot.as_ref().map(|k| KeyDoc {
                    slot: (i + 1) as u8,
                    algorithm: k.algorithm,
                    key: k.key.clone(),
                })
            })
            .collect();
        ConfigDocument {
            radio: Some(RadioDoc {
                model_name: cp.info.model_name.clone(),
                model_id: cp.info.model_id,
            }),
            dtmf: Some(dtmf_doc(&cp.dtmf)),
            encryption_keys,
            contacts,
            rx_groups,
            channels,
            vfo: Some(VfoDoc {
                a: vfo_bank_doc(&cp.vfo.a),
                b: vfo_bank_doc(&cp.vfo.b),
            }),
            settings: Some(cp.settings.clone()),
        }
    }

    pub fn to_codeplug(&self) -> Result<Codeplug, CodecError> {
        let mut cp = Codeplug::default();

        if let Some(radio) = &self.radio {
            check_name(&radio.model_name, crate::info::NAME_LEN, "radio.modelName")?;
            cp.info = RadioInfo {
                model_name: radio.model_name.clone(),
                model_id: radio.model_id.min(MAX_MODEL_ID),
            };
        }

        if let Some(dtmf) = &self.dtmf {
            check_digits(&dtmf.current_id, MAX_ID_DIGITS, "dtmf.currentId")?;
            let mut model = Dtmf {
                current_id: dtmf.current_id.to_ascii_uppercase(),
                ptt_id: dtmf.ptt_id,
                duration: dtmf.duration,
                interval: dtmf.interval,
                ..Dtmf::default()
            };
            for group in &dtmf.code_groups {
                let path = format!("dtmf.codeGroups[{}]", group.slot);
                check_digits(&group.code, MAX_GROUP_DIGITS, &path)?;
                let index = slot_index(group.slot as usize, MAX_CODE_GROUPS);
                model.code_groups[index] = Some(group.code.to_ascii_uppercase());
            }
            cp.dtmf = model;
        }

        for key in &self.encryption_keys {
            let path = format!("encryptionKeys[{}].key", key.slot);
            let normalized = normalize_key(&key.key, key.algorithm, &path)?;
            let index = slot_index(key.slot as usize, MAX_KEYS);
            cp.keys[index] = Some(EncryptionKey {
                algorithm: key.algorithm,
                key: normalized,
            });
        }

        for contact in &self.contacts {
            let path = format!("contacts[{}]", contact.slot);
            check_call_id(contact.call_id, &format!("{path}.callId"))?;
            check_name(&contact.name, contact::NAME_LEN, &format!("{path}.name"))?;
            let index = slot_index(contact.slot as usize, MAX_CONTACTS);
            cp.contacts[index] = Some(Contact {
                call_type: contact.call_type,
                id: contact.call_id,
                name: contact.name.clone(),
            });
        }

        for group in &self.rx_groups {
            let path = format!("rxGroups[{}]", group.slot);
            check_name(&group.name, crate::group::NAME_LEN, &format!("{path}.name"))?;
            for (i, &member) in group.members.iter().enumerate() {
                check_call_id(member, &format!("{path}.members[{i}]"))?;
            }
            let mut members = group.members.clone();
            members.truncate(MAX_MEMBERS);
            let index = slot_index(group.slot as usize, MAX_GROUPS);
            cp.groups[index] = Some(RxGroup {
                name: group.name.clone(),
                members,
            });
        }

        for ch in &self.channels {
            let index = slot_index(ch.slot as usize, MAX_CHANNELS);
            cp.channels[index] = Some(channel_from_doc(ch)?);
        }

        if let Some(vfo) = &self.vfo {
            cp.vfo = VfoBanks {
                a: vfo_bank_from_doc(&vfo.a, "vfo.a", BANK_A_DEFAULT_FREQ)?,
                b: vfo_bank_from_doc(&vfo.b, "vfo.b", BANK_B_DEFAULT_FREQ)?,
            };
        }

        if let Some(settings) = &self.settings {
            cp.settings = settings.clone();
        }

        Ok(cp)
    }
}

fn dtmf_doc(dtmf: &Dtmf) -> DtmfDoc {
    DtmfDoc {
        current_id: dtmf.current_id.clone(),
        ptt_id: dtmf.ptt_id,
        duration: dtmf.duration,
        interval: dtmf.interval,
        code_groups: dtmf
            .code_groups
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| {
                slot.as_ref().map(|code| DtmfGroupDoc {
                    slot: (i + 1) as u8,
                    code: code.clone(),
                })
            })
            .collect(),
    }
}

fn channel_doc(slot: usize, ch: &Channel) -> ChannelDoc {
    ChannelDoc {
        slot: slot as u16,
        name: ch.name.clone(),
        kind: ch.kind,
        rx_freq: format_mhz(ch.rx_freq),
        tx_freq: format_mhz(ch.tx_freq),
        rx_sub_audio: render_sub_audio(ch.rx_sub_audio),
        tx_sub_audio: render_sub_audio(ch.tx_sub_audio),
        power: ch.power,
        bandwidth: ch.bandwidth,
        color_code: ch.color_code,
        time_slot: ch.time_slot,
        contact: ch.tx_contact,
        rx_group: ch.rx_group,
        encryption_key: ch.encryption_key,
        learn_fhss: ch.learn_fhss,
        scan_add: ch.scan_add,
        fhss: ch.fhss.clone(),
    }
}

fn channel_from_doc(doc: &ChannelDoc) -> Result<Channel, CodecError> {
    let path = format!("channels[{}]", doc.slot);
    check_name(&doc.name, channel::NAME_LEN, &format!("{path}.name"))?;
    Ok(Channel {
        name: doc.name.clone(),
        rx_freq: parse_freq(&doc.rx_freq, &format!("{path}.rxFreq"))?,
        tx_freq: parse_freq(&doc.tx_freq, &format!("{path}.txFreq"))?,
        rx_sub_audio: parse_sub_audio(&doc.rx_sub_audio, &format!("{path}.rxSubAudio"))?,
        tx_sub_audio: parse_sub_audio(&doc.tx_sub_audio, &format!("{path}.txSubAudio"))?,
        power: doc.power,
        bandwidth: doc.bandwidth,
        kind: doc.kind,
        color_code: doc.color_code.min(15),
        time_slot: doc.time_slot,
        tx_contact: clamp_ref(doc.contact, MAX_CONTACTS),
        rx_group: clamp_ref(doc.rx_group, MAX_GROUPS),
        encryption_key: doc.encryption_key.map(|k| k.clamp(1, MAX_KEYS as u8)),
        learn_fhss: doc.learn_fhss,
        scan_add: doc.scan_add,
        fhss: normalize_fhss(&doc.fhss, &format!("{path}.fhss"))?,
    })
}

fn vfo_bank_doc(bank: &VfoBank) -> VfoBankDoc {
    VfoBankDoc {
        name: bank.name.clone(),
        rx_freq: Some(format_mhz(bank.rx_freq)),
        tx_freq: Some(format_mhz(bank.tx_freq)),
        rx_sub_audio: render_sub_audio(bank.rx_sub_audio),
        tx_sub_audio: render_sub_audio(bank.tx_sub_audio),
        kind: bank.kind,
        power: bank.power,
        bandwidth: bank.bandwidth,
        color_code: bank.color_code,
        time_slot: bank.time_slot,
        contact: bank.tx_contact,
        rx_group: bank.rx_group,
        encryption_key: bank.encryption_key,
        step: bank.step,
    }
}

fn vfo_bank_from_doc(
    doc: &VfoBankDoc,
    path: &str,
    default_freq: u32,
) -> Result<VfoBank, CodecError> {
    check_name(&doc.name, channel::NAME_LEN, &format!("{path}.name"))?;
    let rx_freq = match &doc.rx_freq {
        Some(s) => parse_freq(s, &format!("{path}.rxFreq"))?,
        None => default_freq,
    };
    let tx_freq = match &doc.tx_freq {
        Some(s) => parse_freq(s, &format!("{path}.txFreq"))?,
        None => default_freq,
    };
    Ok(VfoBank {
        name: doc.name.clone(),
        rx_freq,
        tx_freq,
        rx_sub_audio: parse_sub_audio(&doc.rx_sub_audio, &format!("{path}.rxSubAudio"))?,
        tx_sub_audio: parse_sub_audio(&doc.tx_sub_audio, &format!("{path}.txSubAudio"))?,
        power: doc.power,
        bandwidth: doc.bandwidth,
        kind: doc.kind,
        color_code: doc.color_code.min(15),
        time_slot: doc.time_slot,
        tx_contact: clamp_ref(doc.contact, MAX_CONTACTS),
        rx_group: clamp_ref(doc.rx_group, MAX_GROUPS),
        encryption_key: doc.encryption_key.map(|k| k.clamp(1, MAX_KEYS as u8)),
        step: doc.step,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subaudio::SubAudio;

    fn sample_codeplug() -> Codeplug {
        let mut cp = Codeplug::default();
        cp.info.model_name = "RT-5D".into();
        cp.info.model_id = 888;
        cp.contacts[0] = Some(Contact {
            call_type: CallType::Group,
            id: 91,
            name: "Worldwide".into(),
        });
        cp.groups[0] = Some(RxGroup {
            name: "Locals".into(),
            members: vec![91, 92],
        });
        cp.channels[0] = Some(Channel {
            name: "Repeater".into(),
            rx_freq: 43_850_000,
            tx_freq: 43_250_000,
            tx_sub_audio: SubAudio::Ctcss(885),
            kind: ChannelKind::DmrTier2,
            color_code: 7,
            time_slot: TimeSlot::Slot2,
            tx_contact: Some(1),
            rx_group: Some(1),
            scan_add: true,
            ..Channel::default()
        });
        cp.keys[2] = Some(EncryptionKey {
            algorithm: KeyAlgorithm::Arc4,
            key: "1234500000".into(),
        });
        cp.dtmf.current_id = "123".into();
        cp.dtmf.code_groups[0] = Some("911".into());
        cp
    }

    #[test]
    fn codeplug_document_roundtrip() {
        let cp = sample_codeplug();
        let doc = ConfigDocument::from_codeplug(&cp);
        let back = doc.to_codeplug().unwrap();
        assert_eq!(back, cp);
    }

    #[test]
    fn document_channel_is_byte_stable_through_binary() {
        let cp = sample_codeplug();
        let doc = ConfigDocument::from_codeplug(&cp);
        let json = serde_json::to_string_pretty(&doc).unwrap();

        let reparsed: ConfigDocument = serde_json::from_str(&json).unwrap();
        let payloads = reparsed.to_codeplug().unwrap().to_payloads();
        let decoded = Codeplug::from_payloads(&payloads);
        let json2 = serde_json::to_string_pretty(&ConfigDocument::from_codeplug(&decoded)).unwrap();
        assert_eq!(json, json2);
    }

    #[test]
    fn defaults_are_omitted_from_the_document() {
        let cp = sample_codeplug();
        let json = serde_json::to_string(&ConfigDocument::from_codeplug(&cp)).unwrap();
        // The sample channel is high power with no FHSS or encryption.
        assert!(!json.contains("\"power\""));
        assert!(!json.contains("\"fhss\""));
        assert!(!json.contains("\"learnFhss\""));
        assert!(!json.contains("\"rxSubAudio\""));
        assert!(json.contains("\"txSubAudio\":\"CTCSS 88.5\""));
        assert!(json.contains("\"timeSlot\":\"Slot2\""));
        assert!(json.contains("\"colorCode\":7"));
    }

    #[test]
    fn field_names_are_lower_camel() {
        let json = serde_json::to_string(&ConfigDocument::from_codeplug(&sample_codeplug())).unwrap();
        for key in [
            "\"encryptionKeys\"",
            "\"rxGroups\"",
            "\"modelName\"",
            "\"callType\"",
            "\"callId\"",
            "\"rxFreq\"",
            "\"currentId\"",
        ] {
            assert!(json.contains(key), "missing {key} in {json}");
        }
    }

    #[test]
    fn unknown_enum_name_falls_back_to_default() {
        let json = r#"{
            "channels": [
                {"slot": 1, "rxFreq": "438.500000", "txFreq": "438.500000",
                 "power": "Turbo", "kind": "DmrTier9"}
            ]
        }"#;
        let doc: ConfigDocument = serde_json::from_str(json).unwrap();
        let cp = doc.to_codeplug().unwrap();
        let ch = cp.channels[0].as_ref().unwrap();
        assert_eq!(ch.power, Power::default());
        assert_eq!(ch.kind, ChannelKind::default());
    }

    #[test]
    fn out_of_range_slots_are_clamped() {
        let json = r#"{
            "contacts": [
                {"slot": 5000, "callType": "Private", "callId": 7, "name": "X"},
                {"slot": 0, "callType": "Group", "callId": 8, "name": "Y"}
            ]
        }"#;
        let doc: ConfigDocument = serde_json::from_str(json).unwrap();
        let cp = doc.to_codeplug().unwrap();
        assert_eq!(cp.contacts[3999].as_ref().unwrap().id, 7);
        assert_eq!(cp.contacts[0].as_ref().unwrap().id, 8);
    }

    #[test]
    fn missing_sections_become_default_blocks() {
        let doc: ConfigDocument = serde_json::from_str("{}").unwrap();
        let cp = doc.to_codeplug().unwrap();
        assert_eq!(cp, Codeplug::default());
        assert_eq!(cp.vfo.a.rx_freq, BANK_A_DEFAULT_FREQ);
    }

    #[test]
    fn bad_frequency_reports_the_field_path() {
        let json = r#"{"channels": [{"slot": 3, "rxFreq": "438,5", "txFreq": "438.5"}]}"#;
        let doc: ConfigDocument = serde_json::from_str(json).unwrap();
        let err = doc.to_codeplug().unwrap_err();
        assert_eq!(
            err.to_string(),
            "channels[3].rxFreq: invalid frequency `438,5` (expected MHz with up to six decimals)"
        );
    }

    #[test]
    fn bad_call_id_is_rejected() {
        let json = r#"{"contacts": [{"slot": 1, "callId": 16777216, "name": "X"}]}"#;
        let doc: ConfigDocument = serde_json::from_str(json).unwrap();
        assert!(matches!(
            doc.to_codeplug().unwrap_err(),
            CodecError::BadCallId { .. }
        ));
    }

    #[test]
    fn short_key_is_zero_padded() {
        let json = r#"{"encryptionKeys": [{"slot": 1, "algorithm": "Arc4", "key": "ab"}]}"#;
        let doc: ConfigDocument = serde_json::from_str(json).unwrap();
        let cp = doc.to_codeplug().unwrap();
        assert_eq!(cp.keys[0].as_ref().unwrap().key, "AB00000000");
    }

    #[test]
    fn oversized_key_is_rejected() {
        let json = r#"{"encryptionKeys": [{"slot": 1, "algorithm": "Arc4", "key": "00112233445"}]}"#;
        let doc: ConfigDocument = serde_json::from_str(json).unwrap();
        assert!(matches!(
            doc.to_codeplug().unwrap_err(),
            CodecError::BadHexKey { .. }
        ));
    }

    #[test]
    fn name_too_long_in_gb2312_is_rejected() {
        let json = r#"{"contacts": [{"slot": 1, "callId": 1, "name": "六个汉字名字太长"}]}"#;
        let doc: ConfigDocument = serde_json::from_str(json).unwrap();
        assert!(matches!(
            doc.to_codeplug().unwrap_err(),
            CodecError::NameTooLong { .. }
        ));
    }

    #[test]
    fn vfo_defaults_when_section_is_sparse() {
        let json = r#"{"vfo": {"a": {"kind": "Analog"}, "b": {}}}"#;
        let doc: ConfigDocument = serde_json::from_str(json).unwrap();
        let cp = doc.to_codeplug().unwrap();
        assert_eq!(cp.vfo.a.rx_freq, BANK_A_DEFAULT_FREQ);
        assert_eq!(cp.vfo.a.kind, ChannelKind::Analog);
        assert_eq!(cp.vfo.b.rx_freq, BANK_B_DEFAULT_FREQ);
    }
}
