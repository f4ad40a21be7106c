use std::borrow::Cow;
use std::convert::TryInto;
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

use super::registry::MetaTagInfo;
use super::templates::section_template;
use super::types::{AddrKind, MetaTagType};
use crate::erf::ErfTimestamp;

/// A typed address carried by a tag
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MetaAddr {
    Ipv4(Ipv4Addr),
    Ipv6(Ipv6Addr),
    Mac([u8; 6]),
    Eui([u8; 8]),
    Wwn([u8; 8]),
    FcId([u8; 3]),
    IbGid(Ipv6Addr),
    IbLid(u16),
}

impl MetaAddr {
    /// Read an address of family `kind` from the start of `i`
    pub fn parse(kind: AddrKind, i: &[u8]) -> Option<MetaAddr> {
        let addr = match kind {
            AddrKind::Ipv4 => MetaAddr::Ipv4(Ipv4Addr::from(array::<4>(i)?)),
            AddrKind::Ipv6 => MetaAddr::Ipv6(Ipv6Addr::from(array::<16>(i)?)),
            AddrKind::Mac => MetaAddr::Mac(array(i)?),
            AddrKind::Eui => MetaAddr::Eui(array(i)?),
            AddrKind::Wwn => MetaAddr::Wwn(array(i)?),
            AddrKind::FcId => MetaAddr::FcId(array(i)?),
            AddrKind::IbGid => MetaAddr::IbGid(Ipv6Addr::from(array::<16>(i)?)),
            AddrKind::IbLid => MetaAddr::IbLid(u16::from_be_bytes(array(i)?)),
        };
        Some(addr)
    }
}

fn fmt_hex_bytes(f: &mut fmt::Formatter, b: &[u8], sep: char) -> fmt::Result {
    for (n, byte) in b.iter().enumerate() {
        if n > 0 {
            write!(f, "{}", sep)?;
        }
        write!(f, "{:02x}", byte)?;
    }
    Ok(())
}

impl fmt::Display for MetaAddr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MetaAddr::Ipv4(a) => write!(f, "{}", a),
            MetaAddr::Ipv6(a) | MetaAddr::IbGid(a) => write!(f, "{}", a),
            MetaAddr::Mac(b) => fmt_hex_bytes(f, b, ':'),
            MetaAddr::Eui(b) | MetaAddr::Wwn(b) => fmt_hex_bytes(f, b, ':'),
            MetaAddr::FcId(b) => fmt_hex_bytes(f, b, '.'),
            MetaAddr::IbLid(lid) => write!(f, "{}", lid),
        }
    }
}

/// One named sub-field extracted from a bitfield tag
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BitfieldValue {
    pub name: &'static str,
    /// Value of the sub-field, shifted down to bit 0
    pub value: u64,
}

/// Decoded value of a MetaERF tag
#[derive(Clone, Debug, PartialEq)]
pub enum MetaValue<'a> {
    Unsigned(u64),
    Signed(i64),
    /// Enumerated value, with its label if the value is listed
    Enum {
        value: u64,
        label: Option<&'static str>,
    },
    Str(Cow<'a, str>),
    Bytes(&'a [u8]),
    Time(ErfTimestamp),
    /// Relative time, in nanoseconds
    Duration(u64),
    /// Bits per second
    Rate(u64),
    /// Bytes
    Size(u64),
    /// Signed fixed point value, `raw / 10^decimals` in `unit`
    Fixed {
        raw: i64,
        decimals: u32,
        unit: &'static str,
    },
    Cidr(u32),
    Addr(MetaAddr),
    SectionRef {
        section: u16,
        id: u16,
    },
    Bitfield {
        raw: u64,
        fields: Vec<BitfieldValue>,
    },
    NameService {
        addr: MetaAddr,
        name: Cow<'a, str>,
    },
    /// PTP TimeInterval, nanoseconds scaled by 2^16
    PtpInterval(i64),
    /// PTP epoch time
    PtpTime {
        secs: u64,
        nanos: u32,
    },
}

#[inline]
fn array<const N: usize>(i: &[u8]) -> Option<[u8; N]> {
    i.get(..N)?.try_into().ok()
}

#[inline]
fn be_uint(i: &[u8], len: usize) -> Option<u64> {
    let b = i.get(..len)?;
    Some(b.iter().fold(0u64, |acc, x| (acc << 8) | u64::from(*x)))
}

fn meta_str(i: &[u8]) -> Cow<str> {
    let end = i.iter().rposition(|b| *b != 0).map_or(0, |p| p + 1);
    String::from_utf8_lossy(&i[..end])
}

fn fixed<'a>(i: &'a [u8], decimals: u32, unit: &'static str) -> Option<MetaValue<'a>> {
    let raw = i32::from_be_bytes(array(i)?);
    Some(MetaValue::Fixed {
        raw: i64::from(raw),
        decimals,
        unit,
    })
}

fn integer<'a>(info: &MetaTagInfo, value: u64) -> MetaValue<'a> {
    if info.labels.is_empty() {
        MetaValue::Unsigned(value)
    } else {
        MetaValue::Enum {
            value,
            label: info.label(value),
        }
    }
}

/// Decode the value bytes of a tag according to its descriptor
///
/// `i` holds exactly the declared value length, which the caller has checked against the
/// minimum length of the type. Returns `None` for padding and section headers.
pub fn decode_value<'a>(info: &MetaTagInfo, i: &'a [u8]) -> Option<MetaValue<'a>> {
    let value = match info.kind {
        MetaTagType::Padding | MetaTagType::SectionHeader => return None,
        MetaTagType::String => MetaValue::Str(meta_str(i)),
        MetaTagType::Binary => MetaValue::Bytes(i),
        MetaTagType::U8 => integer(info, be_uint(i, 1)?),
        MetaTagType::U16 => integer(info, be_uint(i, 2)?),
        MetaTagType::U32 => integer(info, be_uint(i, 4)?),
        MetaTagType::U64 => integer(info, be_uint(i, 8)?),
        MetaTagType::I32 => MetaValue::Signed(i64::from(i32::from_be_bytes(array(i)?))),
        MetaTagType::I64 => MetaValue::Signed(i64::from_be_bytes(array(i)?)),
        MetaTagType::ErfTime => MetaValue::Time(ErfTimestamp(u64::from_le_bytes(array(i)?))),
        MetaTagType::DurationNs => MetaValue::Duration(be_uint(i, 8)?),
        MetaTagType::Rate => MetaValue::Rate(be_uint(i, 8)?),
        MetaTagType::Size => MetaValue::Size(be_uint(i, 8)?),
        MetaTagType::Latitude | MetaTagType::Longitude => fixed(i, 7, "°")?,
        MetaTagType::Power => fixed(i, 2, "dBm")?,
        MetaTagType::Temperature => fixed(i, 3, "°C")?,
        MetaTagType::Cidr => MetaValue::Cidr(be_uint(i, 4)? as u32),
        MetaTagType::Addr(kind) => MetaValue::Addr(MetaAddr::parse(kind, i)?),
        MetaTagType::SectionRef => MetaValue::SectionRef {
            section: u16::from_be_bytes(array(i)?),
            id: u16::from_be_bytes(array(i.get(2..)?)?),
        },
        MetaTagType::Bitfield32 | MetaTagType::Bitfield64 => {
            let width = if info.kind == MetaTagType::Bitfield32 { 4 } else { 8 };
            let raw = be_uint(i, width)?;
            let fields = info
                .subfields
                .iter()
                .map(|s| BitfieldValue {
                    name: s.name,
                    value: (raw & s.mask) >> s.mask.trailing_zeros().min(63),
                })
                .collect();
            MetaValue::Bitfield { raw, fields }
        }
        MetaTagType::NameService(kind) => MetaValue::NameService {
            addr: MetaAddr::parse(kind, i)?,
            name: meta_str(&i[kind.len()..]),
        },
        MetaTagType::PtpTimeInterval => MetaValue::PtpInterval(i64::from_be_bytes(array(i)?)),
        MetaTagType::PtpTime => {
            let ns = be_uint(i, 8)?;
            MetaValue::PtpTime {
                secs: ns / 1_000_000_000,
                nanos: (ns % 1_000_000_000) as u32,
            }
        }
    };
    Some(value)
}

/// Format `value / base^n` with at most 3 decimals, and the matching suffix
fn fmt_scaled(f: &mut fmt::Formatter, value: u64, base: f64, suffixes: &[&str]) -> fmt::Result {
    let mut v = value as f64;
    let mut idx = 0;
    while v >= base && idx + 1 < suffixes.len() {
        v /= base;
        idx += 1;
    }
    let s = format!("{:.3}", v);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    write!(f, "{} {}", s, suffixes[idx])
}

impl<'a> fmt::Display for MetaValue<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MetaValue::Unsigned(v) => write!(f, "{}", v),
            MetaValue::Signed(v) => write!(f, "{}", v),
            MetaValue::Enum {
                value,
                label: Some(l),
            } => write!(f, "{} ({})", l, value),
            MetaValue::Enum { value, label: None } => write!(f, "Unknown ({})", value),
            MetaValue::Str(s) => write!(f, "{}", s),
            MetaValue::Bytes(b) => fmt_hex_bytes(f, b, ' '),
            MetaValue::Time(ts) => write!(f, "{}", ts),
            MetaValue::Duration(ns) => write!(f, "{} ns", ns),
            MetaValue::Rate(v) => {
                fmt_scaled(f, *v, 1000.0, &["bps", "Kbps", "Mbps", "Gbps", "Tbps"])
            }
            MetaValue::Size(v) => fmt_scaled(f, *v, 1024.0, &["B", "KiB", "MiB", "GiB", "TiB"]),
            MetaValue::Fixed {
                raw,
                decimals,
                unit,
            } => {
                let div = 10u64.pow(*decimals);
                let sign = if *raw < 0 { "-" } else { "" };
                let abs = raw.unsigned_abs();
                write!(
                    f,
                    "{}{}.{:0width$} {}",
                    sign,
                    abs / div,
                    abs % div,
                    unit,
                    width = *decimals as usize
                )
            }
            MetaValue::Cidr(n) => write!(f, "/{}", n),
            MetaValue::Addr(a) => write!(f, "{}", a),
            MetaValue::SectionRef { section, id } => match section_template(*section) {
                Some(t) => write!(f, "{} section {}", t.name, id),
                None => write!(f, "section 0x{:04x} {}", section, id),
            },
            MetaValue::Bitfield { raw, .. } => write!(f, "0x{:08x}", raw),
            MetaValue::NameService { addr, name } => write!(f, "{} {}", addr, name),
            MetaValue::PtpInterval(v) => {
                let s = format!("{:.3}", *v as f64 / 65536.0);
                write!(f, "{} ns", s.trim_end_matches('0').trim_end_matches('.'))
            }
            MetaValue::PtpTime { secs, nanos } => write!(f, "{}.{:09}", secs, nanos),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::MetaRegistry;
    use hex_literal::hex;

    fn decode<'a>(section: u16, tag: u16, i: &'a [u8]) -> MetaValue<'a> {
        let info = MetaRegistry::global().resolve(section, tag);
        decode_value(info, i).expect("no value")
    }

    #[test]
    fn test_string_trims_nul() {
        let v = decode(0xff01, 24, b"probe01\0");
        assert_eq!(v, MetaValue::Str(Cow::Borrowed("probe01")));
    }

    #[test]
    fn test_rate_and_size() {
        let v = decode(0xff03, 0x0105, &hex!("00 00 00 02 54 0B E4 00"));
        assert_eq!(v, MetaValue::Rate(10_000_000_000));
        assert_eq!(v.to_string(), "10 Gbps");
        assert_eq!(MetaValue::Rate(999).to_string(), "999 bps");
        assert_eq!(MetaValue::Size(1536).to_string(), "1.5 KiB");
        assert_eq!(MetaValue::Size(512).to_string(), "512 B");
    }

    #[test]
    fn test_fixed_point() {
        // -12.34 dBm
        let v = decode(0xff03, 0x010d, &hex!("FF FF FB 2E"));
        assert_eq!(v.to_string(), "-12.34 dBm");
        let latitude = (-365_000_000i32).to_be_bytes();
        let v = decode(0xff01, 33, &latitude);
        assert_eq!(v.to_string(), "-36.5000000 °");
        let temperature = 41_250i32.to_be_bytes();
        let v = decode(0xff01, 66, &temperature);
        assert_eq!(v.to_string(), "41.250 °C");
    }

    #[test]
    fn test_enum_labels() {
        let v = decode(0xff04, 0x0148, &hex!("11 00 00 00"));
        assert_eq!(
            v,
            MetaValue::Enum {
                value: 17,
                label: Some("UDP")
            }
        );
        assert_eq!(v.to_string(), "UDP (17)");
    }

    #[test]
    fn test_bitfield() {
        let v = decode(0xff00, 0x0207, &hex!("06 21 4E 5D"));
        let fields = match v {
            MetaValue::Bitfield { raw, fields } => {
                assert_eq!(raw, 0x0621_4e5d);
                fields
            }
            _ => panic!("unexpected value {:?}", v),
        };
        assert_eq!(fields[0].value, 6);
        assert_eq!(fields[1].value, 0x21);
        assert_eq!(fields[2].value, 0x4e5d);
    }

    #[test]
    fn test_name_service() {
        let v = decode(0xff0a, 0x01c2, b"\x0a\x00\x00\x01router\0\0");
        assert_eq!(v.to_string(), "10.0.0.1 router");
    }

    #[test]
    fn test_parent_section_and_cidr() {
        let v = decode(0xff03, 9, &hex!("FF 02 00 03"));
        assert_eq!(
            v,
            MetaValue::SectionRef {
                section: 0xff02,
                id: 3
            }
        );
        assert_eq!(v.to_string(), "Module section 3");
        let v = decode(0xff03, 16, &hex!("00 00 00 18"));
        assert_eq!(v.to_string(), "/24");
    }

    #[test]
    fn test_times() {
        let v = decode(0xff05, 0x0180, &hex!("00 00 00 80 5F 5E 10 00"));
        assert_eq!(v, MetaValue::Time(ErfTimestamp(0x0010_5e5f_8000_0000)));
        let interval = (-3i64 * 65536).to_be_bytes();
        let v = decode(0xff00, 0x0202, &interval);
        assert_eq!(v.to_string(), "-3 ns");
        let epoch = 1_500_000_000u64.to_be_bytes();
        let v = decode(0xff00, 0x020f, &epoch);
        assert_eq!(
            v,
            MetaValue::PtpTime {
                secs: 1,
                nanos: 500_000_000
            }
        );
    }

    #[test]
    fn test_addresses() {
        let v = decode(0xff03, 0x0107, &hex!("00 1B 21 AA BB CC 00 00"));
        assert_eq!(v.to_string(), "00:1b:21:aa:bb:cc");
        let v = decode(0xff03, 0x010c, &hex!("01 02 03 00"));
        assert_eq!(v.to_string(), "01.02.03");
    }
}
