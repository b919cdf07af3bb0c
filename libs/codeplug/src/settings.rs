//! Optional functions block: 64 bytes of densely packed radio-wide
//! settings.
//!
//! Each field occupies the low nibble of its own byte, with two
//! exceptions: byte 26 packs the work mode for band A into bits 0–3 and
//! band B into bits 4–7, and byte 50 holds the keep-call time in bits
//! 0–4. Reserved bytes stay `0xFF`.

use crate::doc_enum;
use crate::fields::at;
use crate::SETTINGS_LEN;
use serde::{Deserialize, Serialize};

doc_enum! {
    pub enum BatterySave {
        Off = 0 => "Off",
        Ratio1To1 = 1 => "1:1",
        Ratio1To2 = 2 => "1:2",
        Ratio1To3 = 3 => "1:3",
        Ratio1To4 = 4 => "1:4",
    }
}

doc_enum! {
    pub enum VoxDelay {
        S1 = 1 => "1.0s",
        S0_5 = 0 => "0.5s",
        S1_5 = 2 => "1.5s",
        S2 = 3 => "2.0s",
        S2_5 = 4 => "2.5s",
        S3 = 5 => "3.0s",
    }
}

doc_enum! {
    pub enum TimeoutTimer {
        Off = 0 => "Off",
        S30 = 1 => "30s",
        S60 = 2 => "60s",
        S90 = 3 => "90s",
        S120 = 4 => "120s",
        S150 = 5 => "150s",
        S180 = 6 => "180s",
        S210 = 7 => "210s",
        S240 = 8 => "240s",
        S270 = 9 => "270s",
    }
}

doc_enum! {
    pub enum VoicePrompt {
        Off = 0 => "Off",
        Chinese = 1 => "Chinese",
        English = 2 => "English",
    }
}

doc_enum! {
    pub enum BacklightTime {
        S10 = 2 => "10s",
        Always = 0 => "Always",
        S5 = 1 => "5s",
        S15 = 3 => "15s",
        S30 = 4 => "30s",
    }
}

doc_enum! {
    pub enum DisplayMode {
        Name = 0 => "Name",
        Frequency = 1 => "Frequency",
        Number = 2 => "Number",
    }
}

doc_enum! {
    pub enum Roger {
        Off = 0 => "Off",
        Begin = 1 => "Begin",
        End = 2 => "End",
        Both = 3 => "Both",
    }
}

doc_enum! {
    pub enum ScanMode {
        Time = 0 => "Time",
        Carrier = 1 => "Carrier",
        Search = 2 => "Search",
    }
}

doc_enum! {
    pub enum PowerOnDisplay {
        Logo = 0 => "Logo",
        Voltage = 1 => "Voltage",
        Off = 2 => "Off",
    }
}

doc_enum! {
    pub enum AlarmMode {
        Local = 0 => "Local",
        Remote = 1 => "Remote",
        LocalAndRemote = 2 => "LocalAndRemote",
    }
}

doc_enum! {
    pub enum SideKeyAction {
        None = 0 => "None",
        FmRadio = 1 => "FmRadio",
        TxPower = 2 => "TxPower",
        Alarm = 3 => "Alarm",
        Vox = 4 => "Vox",
        Monitor = 5 => "Monitor",
        Scan = 6 => "Scan",
    }
}

doc_enum! {
    pub enum MenuExitTime {
        S10 = 1 => "10s",
        S5 = 0 => "5s",
        S15 = 2 => "15s",
        S30 = 3 => "30s",
        S60 = 4 => "60s",
    }
}

doc_enum! {
    pub enum WorkMode {
        Channel = 1 => "Channel",
        Vfo = 0 => "Vfo",
    }
}

doc_enum! {
    pub enum ActiveBand {
        A = 0 => "A",
        B = 1 => "B",
    }
}

doc_enum! {
    pub enum TxPriority {
        Edit = 0 => "Edit",
        Busy = 1 => "Busy",
    }
}

doc_enum! {
    pub enum Language {
        Chinese = 0 => "Chinese",
        English = 1 => "English",
    }
}

doc_enum! {
    pub enum AutoPowerOff {
        Off = 0 => "Off",
        M30 = 1 => "30min",
        H1 = 2 => "1h",
        H2 = 3 => "2h",
        H4 = 4 => "4h",
    }
}

doc_enum! {
    pub enum MonitorMode {
        Momentary = 0 => "Momentary",
        Latch = 1 => "Latch",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub squelch_level: u8,
    pub battery_save: BatterySave,
    pub vox_level: u8,
    pub vox_delay: VoxDelay,
    pub timeout_timer: TimeoutTimer,
    pub beep: bool,
    pub voice_prompt: VoicePrompt,
    pub auto_key_lock: bool,
    pub backlight_time: BacklightTime,
    pub display_mode: DisplayMode,
    pub dual_watch: bool,
    pub roger: Roger,
    pub scan_mode: ScanMode,
    pub power_on_display: PowerOnDisplay,
    pub talkaround: bool,
    pub fm_radio: bool,
    pub alarm_mode: AlarmMode,
    pub tail_tone: bool,
    pub side_key1_short: SideKeyAction,
    pub side_key1_long: SideKeyAction,
    pub side_key2_short: SideKeyAction,
    pub side_key2_long: SideKeyAction,
    pub mic_gain: u8,
    pub lcd_brightness: u8,
    pub menu_exit_time: MenuExitTime,
    pub call_end_prompt: bool,
    pub work_mode_a_ch: WorkMode,
    pub work_mode_b_ch: WorkMode,
    pub active_band: ActiveBand,
    pub digital_mic_gain: u8,
    pub sms_tone: bool,
    pub record_enable: bool,
    pub private_call_confirm: bool,
    pub busy_lock: bool,
    pub frequency_lock: bool,
    pub tx_priority: TxPriority,
    pub auto_backlight: bool,
    pub dtmf_sidetone: bool,
    pub language: Language,
    pub auto_power_off: AutoPowerOff,
    pub rx_backlight: bool,
    pub monitor_mode: MonitorMode,
    /// Seconds a call stays on screen after it ends, 0..=30.
    pub keep_call_time: u8,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            squelch_level: 5,
            battery_save: BatterySave::default(),
            vox_level: 0,
            vox_delay: VoxDelay::default(),
            timeout_timer: TimeoutTimer::default(),
            beep: true,
            voice_prompt: VoicePrompt::default(),
            auto_key_lock: false,
            backlight_time: BacklightTime::default(),
            display_mode: DisplayMode::default(),
            dual_watch: false,
            roger: Roger::default(),
            scan_mode: ScanMode::default(),
            power_on_display: PowerOnDisplay::default(),
            talkaround: false,
            fm_radio: false,
            alarm_mode: AlarmMode::default(),
            tail_tone: true,
            side_key1_short: SideKeyAction::default(),
            side_key1_long: SideKeyAction::default(),
            side_key2_short: SideKeyAction::default(),
            side_key2_long: SideKeyAction::default(),
            mic_gain: 2,
            lcd_brightness: 3,
            menu_exit_time: MenuExitTime::default(),
            call_end_prompt: false,
            work_mode_a_ch: WorkMode::default(),
            work_mode_b_ch: WorkMode::default(),
            active_band: ActiveBand::default(),
            digital_mic_gain: 2,
            sms_tone: true,
            record_enable: false,
            private_call_confirm: false,
            busy_lock: false,
            frequency_lock: false,
            tx_priority: TxPriority::default(),
            auto_backlight: true,
            dtmf_sidetone: false,
            language: Language::default(),
            auto_power_off: AutoPowerOff::default(),
            rx_backlight: false,
            monitor_mode: MonitorMode::default(),
            keep_call_time: 3,
        }
    }
}

fn nib(buf: &[u8], off: usize) -> u8 {
    at(buf, off) & 0x0F
}

fn flag(buf: &[u8], off: usize) -> bool {
    nib(buf, off) == 1
}

fn level(buf: &[u8], off: usize, max: u8) -> u8 {
    nib(buf, off).min(max)
}

pub fn decode(buf: &[u8]) -> Settings {
    Settings {
        squelch_level: level(buf, 0, 9),
        battery_save: BatterySave::from_raw(nib(buf, 1)).unwrap_or_default(),
        vox_level: level(buf, 2, 9),
        vox_delay: VoxDelay::from_raw(nib(buf, 3)).unwrap_or_default(),
        timeout_timer: TimeoutTimer::from_raw(nib(buf, 4)).unwrap_or_default(),
        beep: flag(buf, 5),
        voice_prompt: VoicePrompt::from_raw(nib(buf, 6)).unwrap_or_default(),
        auto_key_lock: flag(buf, 7),
        backlight_time: BacklightTime::from_raw(nib(buf, 8)).unwrap_or_default(),
        display_mode: DisplayMode::from_raw(nib(buf, 9)).unwrap_or_default(),
        dual_watch: flag(buf, 10),
        roger: Roger::from_raw(nib(buf, 11)).unwrap_or_default(),
        scan_mode: ScanMode::from_raw(nib(buf, 12)).unwrap_or_default(),
        power_on_display: PowerOnDisplay::from_raw(nib(buf, 13)).unwrap_or_default(),
        talkaround: flag(buf, 14),
        fm_radio: flag(buf, 15),
        alarm_mode: AlarmMode::from_raw(nib(buf, 16)).unwrap_or_default(),
        tail_tone: flag(buf, 17),
        side_key1_short: SideKeyAction::from_raw(nib(buf, 18)).unwrap_or_default(),
        side_key1_long: SideKeyAction::from_raw(nib(buf, 19)).unwrap_or_default(),
        side_key2_short: SideKeyAction::from_raw(nib(buf, 20)).unwrap_or_default(),
        side_key2_long: SideKeyAction::from_raw(nib(buf, 21)).unwrap_or_default(),
        mic_gain: level(buf, 22, 4),
        lcd_brightness: level(buf, 23, 5),
        menu_exit_time: MenuExitTime::from_raw(nib(buf, 24)).unwrap_or_default(),
        call_end_prompt: flag(buf, 25),
        work_mode_a_ch: WorkMode::from_raw(at(buf, 26) & 0x0F).unwrap_or_default(),
        work_mode_b_ch: WorkMode::from_raw((at(buf, 26) >> 4) & 0x0F).unwrap_or_default(),
        active_band: ActiveBand::from_raw(nib(buf, 27)).unwrap_or_default(),
        digital_mic_gain: level(buf, 28, 4),
        sms_tone: flag(buf, 29),
        record_enable: flag(buf, 30),
        private_call_confirm: flag(buf, 31),
        busy_lock: flag(buf, 32),
        frequency_lock: flag(buf, 33),
        tx_priority: TxPriority::from_raw(nib(buf, 35)).unwrap_or_default(),
        auto_backlight: flag(buf, 36),
        dtmf_sidetone: flag(buf, 37),
        language: Language::from_raw(nib(buf, 38)).unwrap_or_default(),
        auto_power_off: AutoPowerOff::from_raw(nib(buf, 39)).unwrap_or_default(),
        rx_backlight: flag(buf, 40),
        monitor_mode: MonitorMode::from_raw(nib(buf, 41)).unwrap_or_default(),
        keep_call_time: (at(buf, 50) & 0x1F).min(30),
    }
}

pub fn encode(settings: &Settings) -> Vec<u8> {
    let mut out = vec![0xFF; SETTINGS_LEN];
    out[0] = settings.squelch_level.min(9);
    out[1] = settings.battery_save.raw();
    out[2] = settings.vox_level.min(9);
    out[3] = settings.vox_delay.raw();
    out[4] = settings.timeout_timer.raw();
    out[5] = settings.beep as u8;
    out[6] = settings.voice_prompt.raw();
    out[7] = settings.auto_key_lock as u8;
    out[8] = settings.backlight_time.raw();
    out[9] = settings.display_mode.raw();
    out[10] = settings.dual_watch as u8;
    out[11] = settings.roger.raw();
    out[12] = settings.scan_mode.raw();
    out[13] = settings.power_on_display.raw();
    out[14] = settings.talkaround as u8;
    out[15] = settings.fm_radio as u8;
    out[16] = settings.alarm_mode.raw();
    out[17] = settings.tail_tone as u8;
    out[18] = settings.side_key1_short.raw();
    out[19] = settings.side_key1_long.raw();
    out[20] = settings.side_key2_short.raw();
    out[21] = settings.side_key2_long.raw();
    out[22] = settings.mic_gain.min(4);
    out[23] = settings.lcd_brightness.min(5);
    out[24] = settings.menu_exit_time.raw();
    out[25] = settings.call_end_prompt as u8;
    out[26] = settings.work_mode_a_ch.raw() | (settings.work_mode_b_ch.raw() << 4);
    out[27] = settings.active_band.raw();
    out[28] = settings.digital_mic_gain.min(4);
    out[29] = settings.sms_tone as u8;
    out[30] = settings.record_enable as u8;
    out[31] = settings.private_call_confirm as u8;
    out[32] = settings.busy_lock as u8;
    out[33] = settings.frequency_lock as u8;
    out[35] = settings.tx_priority.raw();
    out[36] = settings.auto_backlight as u8;
    out[37] = settings.dtmf_sidetone as u8;
    out[38] = settings.language.raw();
    out[39] = settings.auto_power_off.raw();
    out[40] = settings.rx_backlight as u8;
    out[41] = settings.monitor_mode.raw();
    out[50] = settings.keep_call_time.min(30) & 0x1F;
    out
}
