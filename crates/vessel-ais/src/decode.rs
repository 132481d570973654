//! AIS sentence decoding — out of scope per spec §1 ("treated as a pure
//! function from byte strings to structured records"), but something has to
//! turn `ais.raw` sentences into [`DecodedMessage`]s for the pipeline to be
//! exercisable end to end. This is a minimal AIVDM/AIVDO decoder covering
//! the message types the data model actually uses: class-A position reports
//! (1/2/3) and static & voyage data (5).
//!
//! Not a general-purpose AIS library: no class-B reports, no base-station
//! messages, no binary application payloads. Callers that need more are
//! expected to supply their own decoder behind the same `ais.raw ->
//! ais.decoded` topic contract.

use thiserror::Error;

use crate::types::DecodedMessage;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("sentence is not a recognized AIVDM/AIVDO line: {0}")]
    NotASentence(String),
    #[error("sentence has too few comma-separated fields")]
    Truncated,
    #[error("fragment count/number fields are not integers")]
    BadFragmentHeader,
    #[error("6-bit payload contains a character outside the armoring alphabet")]
    BadArmoring,
    #[error("payload too short for message type {msg_type}")]
    PayloadTooShort { msg_type: u8 },
    #[error("unsupported message type {0}")]
    Unsupported(u8),
}

/// One fragment of a (possibly multi-part) AIVDM sentence.
struct Fragment {
    count: u8,
    number: u8,
    seq_id: Option<u8>,
    payload: String,
    fill_bits: u8,
}

fn parse_fragment(line: &str) -> Result<Fragment, DecodeError> {
    let body = line.trim();
    if !(body.starts_with("!AIVDM") || body.starts_with("!AIVDO")) {
        return Err(DecodeError::NotASentence(body.to_string()));
    }
    let body = body.split('*').next().unwrap_or(body);
    let fields: Vec<&str> = body.split(',').collect();
    if fields.len() < 7 {
        return Err(DecodeError::Truncated);
    }

    let count: u8 = fields[1].parse().map_err(|_| DecodeError::BadFragmentHeader)?;
    let number: u8 = fields[2].parse().map_err(|_| DecodeError::BadFragmentHeader)?;
    let seq_id = if fields[3].is_empty() { None } else { fields[3].parse().ok() };
    let payload = fields[5].to_string();
    let fill_bits = fields[6].parse().unwrap_or(0);

    Ok(Fragment { count, number, seq_id, payload, fill_bits })
}

/// Reassembles multi-part AIVDM sentences and decodes completed groups.
///
/// Mirrors the role of the original decoder's internal NMEA queue: a source
/// plugin feeds raw lines in and gets `Some(DecodedMessage)` back once a
/// sentence group completes, `None` while a multi-part group is still
/// buffering.
#[derive(Default)]
pub struct SentenceDecoder {
    pending: std::collections::HashMap<(u8, Option<u8>), Vec<Option<String>>>,
}

impl SentenceDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&mut self, line: &str) -> Result<Option<DecodedMessage>, DecodeError> {
        let fragment = parse_fragment(line)?;

        if fragment.count <= 1 {
            return decode_payload(&fragment.payload, fragment.fill_bits).map(Some);
        }

        let key = (fragment.count, fragment.seq_id);
        let slots = self.pending.entry(key).or_insert_with(|| vec![None; fragment.count as usize]);
        let index = fragment.number.saturating_sub(1) as usize;
        if index < slots.len() {
            slots[index] = Some(fragment.payload.clone());
        }

        if slots.iter().all(Option::is_some) {
            let joined: String = slots.iter().map(|s| s.as_deref().unwrap_or("")).collect();
            self.pending.remove(&key);
            return decode_payload(&joined, fragment.fill_bits).map(Some);
        }

        Ok(None)
    }
}

/// 6-bit ASCII armoring -> bitstring, per ITU-R M.1371: subtract 48, and if
/// the result exceeds 40 subtract a further 8.
fn armor_to_bits(payload: &str) -> Result<Vec<bool>, DecodeError> {
    let mut bits = Vec::with_capacity(payload.len() * 6);
    for ch in payload.bytes() {
        let mut value = ch.checked_sub(48).ok_or(DecodeError::BadArmoring)?;
        if value > 40 {
            value = value.checked_sub(8).ok_or(DecodeError::BadArmoring)?;
        }
        if value > 63 {
            return Err(DecodeError::BadArmoring);
        }
        for shift in (0..6).rev() {
            bits.push((value >> shift) & 1 == 1);
        }
    }
    Ok(bits)
}

fn bits_to_u64(bits: &[bool], start: usize, len: usize) -> u64 {
    let mut value: u64 = 0;
    for bit in bits.iter().skip(start).take(len) {
        value = (value << 1) | (*bit as u64);
    }
    value
}

fn bits_to_i64(bits: &[bool], start: usize, len: usize) -> i64 {
    let raw = bits_to_u64(bits, start, len);
    let sign_bit = 1u64 << (len - 1);
    if raw & sign_bit != 0 {
        (raw as i64) - (1i64 << len)
    } else {
        raw as i64
    }
}

/// 6-bit "AIS ASCII" text field, trimmed of trailing `@`/spaces.
fn bits_to_string(bits: &[bool], start: usize, char_count: usize) -> String {
    const ALPHABET: &[u8; 64] = b"@ABCDEFGHIJKLMNOPQRSTUVWXYZ[\\]^_ !\"#$%&'()*+,-./0123456789:;<=>?";
    let mut out = String::with_capacity(char_count);
    for i in 0..char_count {
        let offset = start + i * 6;
        if offset + 6 > bits.len() {
            break;
        }
        let code = bits_to_u64(bits, offset, 6) as usize;
        out.push(ALPHABET[code] as char);
    }
    out.trim_end_matches(['@', ' ']).to_string()
}

fn decode_payload(payload: &str, fill_bits: u8) -> Result<DecodedMessage, DecodeError> {
    let mut bits = armor_to_bits(payload)?;
    let usable = bits.len().saturating_sub(fill_bits as usize);
    bits.truncate(usable.max(6));

    if bits.len() < 38 {
        return Err(DecodeError::PayloadTooShort { msg_type: 0 });
    }

    let msg_type = bits_to_u64(&bits, 0, 6) as u8;
    let mmsi = bits_to_u64(&bits, 8, 30) as u32;

    match msg_type {
        1 | 2 | 3 => decode_position_report(&bits, mmsi, msg_type),
        5 => decode_static_and_voyage(&bits, mmsi, msg_type),
        other => Err(DecodeError::Unsupported(other)),
    }
}

/// Class-A position report (types 1/2/3), ITU-R M.1371 field layout.
fn decode_position_report(bits: &[bool], mmsi: u32, msg_type: u8) -> Result<DecodedMessage, DecodeError> {
    if bits.len() < 143 {
        return Err(DecodeError::PayloadTooShort { msg_type });
    }

    let speed_raw = bits_to_u64(bits, 50, 10);
    let lon_raw = bits_to_i64(bits, 61, 28);
    let lat_raw = bits_to_i64(bits, 89, 27);
    let cog_raw = bits_to_u64(bits, 116, 12);
    let heading_raw = bits_to_u64(bits, 128, 9);

    Ok(DecodedMessage {
        mmsi,
        msg_type,
        lon: if lon_raw == 181 * 600_000 { None } else { Some(lon_raw as f64 / 600_000.0) },
        lat: if lat_raw == 91 * 600_000 { None } else { Some(lat_raw as f64 / 600_000.0) },
        speed: if speed_raw >= 1023 { None } else { Some(speed_raw as f64 / 10.0) },
        cog: if cog_raw >= 3600 { None } else { Some(cog_raw as f64 / 10.0) },
        heading: if heading_raw >= 511 { None } else { Some(heading_raw as f64) },
        ..Default::default()
    })
}

/// Static and voyage-related data (type 5).
fn decode_static_and_voyage(bits: &[bool], mmsi: u32, msg_type: u8) -> Result<DecodedMessage, DecodeError> {
    if bits.len() < 422 {
        return Err(DecodeError::PayloadTooShort { msg_type });
    }

    let imo = bits_to_u64(bits, 40, 30) as i64;
    let callsign = bits_to_string(bits, 70, 7);
    let shipname = bits_to_string(bits, 112, 20);
    let ship_type = bits_to_u64(bits, 232, 8) as i32;
    let to_bow = bits_to_u64(bits, 240, 9) as i32;
    let to_stern = bits_to_u64(bits, 249, 9) as i32;
    let to_port = bits_to_u64(bits, 258, 6) as i32;
    let to_starboard = bits_to_u64(bits, 264, 6) as i32;

    Ok(DecodedMessage {
        mmsi,
        msg_type,
        imo: Some(imo),
        callsign: if callsign.is_empty() { None } else { Some(callsign) },
        shipname: if shipname.is_empty() { None } else { Some(shipname) },
        ship_type: Some(ship_type),
        to_bow: Some(to_bow),
        to_stern: Some(to_stern),
        to_port: Some(to_port),
        to_starboard: Some(to_starboard),
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A real single-part class-A position report, MMSI 227006730.
    const POSITION_SENTENCE: &str = "!AIVDM,1,1,,B,13P;lhP005wj=OrNShTenrj80@3Q,0*28";

    #[test]
    fn decodes_a_single_part_position_report() {
        let mut decoder = SentenceDecoder::new();
        let message = decoder.feed(POSITION_SENTENCE).unwrap().expect("complete sentence");

        assert!(matches!(message.msg_type, 1 | 2 | 3));
        assert!(message.has_position());
        assert!(message.lat.unwrap().abs() <= 90.0);
        assert!(message.lon.unwrap().abs() <= 180.0);
    }

    #[test]
    fn multipart_sentence_buffers_until_complete() {
        let mut decoder = SentenceDecoder::new();
        let first = decoder.feed("!AIVDM,2,1,3,B,53P;lh`2;:IS8=1?P01H:1<4p@tp00000000000l1p?664pB0=832EQD,0*50").unwrap();
        assert!(first.is_none());

        let second = decoder.feed("!AIVDM,2,2,3,B,T3kk855Ap3l4h00,2*79").unwrap();
        let message = second.expect("second fragment completes the group");
        assert_eq!(message.msg_type, 5);
        assert!(message.has_static_data());
    }

    #[test]
    fn rejects_non_sentence_input() {
        let mut decoder = SentenceDecoder::new();
        assert_eq!(decoder.feed("not a sentence"), Err(DecodeError::NotASentence("not a sentence".to_string())));
    }
}
