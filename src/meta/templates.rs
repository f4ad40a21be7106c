//! Declarative MetaERF templates
//!
//! The same tag code can appear in any section. These lists only describe each tag and each
//! section once; [`MetaRegistry`](super::MetaRegistry) builds the per-section descriptors.

use super::types::AddrKind as A;
use super::types::MetaTagType as T;
use super::types::{BitSubfield, MetaSectionTemplate, MetaTagTemplate, ValueLabels};

const fn tag(code: u16, name: &'static str, abbrev: &'static str, kind: T) -> MetaTagTemplate {
    MetaTagTemplate::new(code, name, abbrev, kind)
}

const fn sub(name: &'static str, abbrev: &'static str, mask: u64) -> BitSubfield {
    BitSubfield { name, abbrev, mask }
}

#[rustfmt::skip]
pub const META_SECTIONS: &[MetaSectionTemplate] = &[
    MetaSectionTemplate { code: 0xff00, name: "Capture", abbrev: "capture" },
    MetaSectionTemplate { code: 0xff01, name: "Host", abbrev: "host" },
    MetaSectionTemplate { code: 0xff02, name: "Module", abbrev: "module" },
    MetaSectionTemplate { code: 0xff03, name: "Interface", abbrev: "interface" },
    MetaSectionTemplate { code: 0xff04, name: "Flow", abbrev: "flow" },
    MetaSectionTemplate { code: 0xff05, name: "Statistics", abbrev: "stats" },
    MetaSectionTemplate { code: 0xff06, name: "Information", abbrev: "info" },
    MetaSectionTemplate { code: 0xff07, name: "Context", abbrev: "context" },
    MetaSectionTemplate { code: 0xff08, name: "Stream", abbrev: "stream" },
    MetaSectionTemplate { code: 0xff09, name: "Transform", abbrev: "transform" },
    MetaSectionTemplate { code: 0xff0a, name: "DNS", abbrev: "dns" },
    MetaSectionTemplate { code: 0xff0b, name: "Source", abbrev: "source" },
    MetaSectionTemplate { code: 0xff0c, name: "Network", abbrev: "network" },
];

const CLK_SOURCE: ValueLabels = &[
    (0, "Unknown"),
    (1, "Host"),
    (2, "Link"),
    (3, "Backplane"),
    (4, "PTP"),
    (5, "GPS"),
    (6, "1PPS"),
];

const CLK_STATE: ValueLabels = &[(0, "Unknown"), (1, "Synchronised"), (2, "Unsynchronised")];

const FLOW_HASH_MODE: ValueLabels = &[
    (1, "2-tuple"),
    (2, "3-tuple"),
    (3, "5-tuple"),
    (4, "Inner 2-tuple"),
    (5, "Inner 5-tuple"),
];

const NPB_FORMAT: ValueLabels = &[(0, "Unknown"), (1, "Ethernet"), (2, "ERF"), (3, "VXLAN")];

const IF_PHY_MODE: ValueLabels = &[
    (0, "Unknown"),
    (1, "Ethernet"),
    (2, "SONET"),
    (3, "SDH"),
    (4, "InfiniBand"),
    (5, "Fibre Channel"),
];

const IF_PORT_TYPE: ValueLabels = &[
    (0, "Unknown"),
    (1, "SFP"),
    (2, "SFP+"),
    (3, "QSFP+"),
    (4, "QSFP28"),
    (5, "RJ45"),
];

const IP_PROTO: ValueLabels = &[
    (1, "ICMP"),
    (6, "TCP"),
    (17, "UDP"),
    (47, "GRE"),
    (58, "ICMPv6"),
    (132, "SCTP"),
];

const FLOW_STATE: ValueLabels = &[(0, "Unknown"), (1, "Open"), (2, "Closed"), (3, "Timed out")];

const DPI_STATE: ValueLabels = &[(0, "Unknown"), (1, "Classifying"), (2, "Classified")];

const PTP_TIME_SOURCE: ValueLabels = &[
    (0x10, "Atomic clock"),
    (0x20, "GPS"),
    (0x30, "Terrestrial radio"),
    (0x40, "PTP"),
    (0x50, "NTP"),
    (0x60, "Hand set"),
    (0x90, "Other"),
    (0xa0, "Internal oscillator"),
];

const PTP_PORT_STATE: ValueLabels = &[
    (1, "Initializing"),
    (2, "Faulty"),
    (3, "Disabled"),
    (4, "Listening"),
    (5, "Pre-master"),
    (6, "Master"),
    (7, "Passive"),
    (8, "Uncalibrated"),
    (9, "Slave"),
];

const PTP_DELAY_MECHANISM: ValueLabels = &[(1, "E2E"), (2, "P2P"), (0xfe, "Disabled")];

const CLK_PORT_PROTO: ValueLabels = &[
    (0, "Unknown"),
    (1, "None"),
    (2, "1PPS"),
    (3, "PTP"),
    (4, "NTP"),
    (5, "IRIG-B"),
];

const GEN_FLAGS: &[BitSubfield] = &[
    sub("Truncated", "trunc", 0x1),
    sub("Incomplete", "incomplete", 0x2),
    sub("Delta", "delta", 0x4),
    sub("Reset", "reset", 0x8),
];

const IF_RX_SFP_FLAGS: &[BitSubfield] = &[
    sub("Transmit fault", "tx_fault", 0x1),
    sub("Loss of signal", "los", 0x2),
    sub("Module absent", "absent", 0x4),
    sub("Power alarm", "power_alarm", 0x8),
];

const CLK_FAIL_FLAGS: &[BitSubfield] = &[
    sub("Signal failure", "signal", 0x1),
    sub("Synchronisation failure", "sync", 0x2),
    sub("Timestamp failure", "timestamp", 0x4),
    sub("Input loss", "input_loss", 0x8),
];

const TUNNELING_MODE: &[BitSubfield] = &[
    sub("IP-in-IP", "ipip", 0x1),
    sub("EoMPLS", "eompls", 0x2),
    sub("GTP", "gtp", 0x4),
    sub("GRE", "gre", 0x8),
    sub("VXLAN", "vxlan", 0x10),
    sub("MPLS", "mpls", 0x20),
];

const STREAM_FLAGS: &[BitSubfield] = &[
    sub("Drop enabled", "drop", 0x1),
    sub("Transmit", "tx", 0x2),
    sub("Mirror", "mirror", 0x4),
];

const EXT_HDRS: &[BitSubfield] = &[
    sub("Classification", "classification", 1 << 1),
    sub("Intercept ID", "intercept_id", 1 << 3),
    sub("Raw Link", "raw_link", 1 << 4),
    sub("BFS", "bfs", 1 << 5),
    sub("Channelised", "channelised", 1 << 12),
    sub("Signature", "signature", 1 << 14),
    sub("Flow ID", "flow_id", 1 << 16),
    sub("Host ID", "host_id", 1 << 17),
];

const IF_LINK_STATUS: &[BitSubfield] = &[
    sub("Link", "link", 0x1),
    sub("Loss of signal", "los", 0x2),
    sub("Loss of frame", "lof", 0x4),
    sub("Remote fault", "remote_fault", 0x8),
    sub("Local fault", "local_fault", 0x10),
];

const PTP_GM_CLOCK_QUALITY: &[BitSubfield] = &[
    sub("Clock class", "clock_class", 0xff00_0000),
    sub("Clock accuracy", "clock_accuracy", 0x00ff_0000),
    sub(
        "Offset scaled log variance",
        "offset_scaled_log_variance",
        0x0000_ffff,
    ),
];

const PTP_TIME_PROPERTIES: &[BitSubfield] = &[
    sub("Leap61", "leap61", 0x01),
    sub("Leap59", "leap59", 0x02),
    sub("Current UTC offset valid", "current_utc_offset_valid", 0x04),
    sub("PTP timescale", "ptp_timescale", 0x08),
    sub("Time traceable", "time_traceable", 0x10),
    sub("Frequency traceable", "frequency_traceable", 0x20),
];

/// Code of the padding tag
pub const TAG_PADDING: u16 = 0;
/// Code of the parent section back-reference tag
pub const TAG_PARENT_SECTION: u16 = 9;

#[rustfmt::skip]
pub const META_TAGS: &[MetaTagTemplate] = &[
    tag(TAG_PADDING, "Padding", "padding", T::Padding),
    tag(1, "Comment", "comment", T::String),
    tag(2, "Flags", "gen_flags", T::Bitfield32).with_subfields(GEN_FLAGS),
    tag(3, "Clock source", "clk_source", T::U32).with_labels(CLK_SOURCE),
    tag(4, "Clock state", "clk_state", T::U32).with_labels(CLK_STATE),
    tag(5, "Clock threshold", "clk_threshold", T::DurationNs),
    tag(6, "Clock correction", "clk_correction", T::I64),
    tag(7, "Clock failure flags", "clk_fail_flags", T::Bitfield32).with_subfields(CLK_FAIL_FLAGS),
    tag(8, "Clock maximum error", "clk_max_error", T::DurationNs),
    tag(TAG_PARENT_SECTION, "Parent section", "parent_section", T::SectionRef),
    tag(10, "Reset time", "reset", T::ErfTime),
    tag(11, "Event time", "event_time", T::ErfTime),
    tag(12, "Host ID", "host_id", T::U64),
    tag(13, "Attribute", "attribute", T::Binary),
    tag(14, "FCS length", "fcs_len", T::U32),
    tag(15, "IPv4 mask", "mask_ipv4", T::Addr(A::Ipv4)),
    tag(16, "CIDR mask", "mask_cidr", T::Cidr),
    tag(17, "Organisation name", "org_name", T::String),
    tag(18, "Name", "name", T::String),
    tag(19, "Description", "descr", T::String),
    tag(20, "Configuration", "config", T::String),
    tag(21, "Datapipe", "datapipe", T::String),
    tag(22, "Application name", "app_name", T::String),
    tag(23, "Operating system", "os", T::String),
    tag(24, "Hostname", "hostname", T::String),
    tag(25, "User", "user", T::String),
    tag(26, "Model", "model", T::String),
    tag(27, "Firmware version", "fw_version", T::String),
    tag(28, "Serial number", "serial_no", T::String),
    tag(29, "Timestamp offset", "ts_offset", T::I64),
    tag(30, "Timestamp clock frequency", "ts_clock_freq", T::U64),
    tag(31, "Timezone offset", "tzone", T::I32),
    tag(32, "Timezone name", "tzone_name", T::String),
    tag(33, "Latitude", "loc_lat", T::Latitude),
    tag(34, "Longitude", "loc_long", T::Longitude),
    tag(35, "Snap length", "snaplen", T::U32),
    tag(36, "Card number", "card_num", T::U32),
    tag(37, "Module number", "module_num", T::U32),
    tag(38, "Access number", "access_num", T::U32),
    tag(39, "Stream number", "stream_num", T::U32),
    tag(40, "Location name", "loc_name", T::String),
    tag(41, "Parent file", "parent_file", T::String),
    tag(42, "Filter", "filter", T::String),
    tag(43, "Flow hash mode", "flow_hash_mode", T::U32).with_labels(FLOW_HASH_MODE),
    tag(44, "Tunneling mode", "tunneling_mode", T::Bitfield32).with_subfields(TUNNELING_MODE),
    tag(45, "NPB format", "npb_format", T::U32).with_labels(NPB_FORMAT),
    tag(46, "Memory", "mem", T::Size),
    tag(47, "Datamine ID", "datamine_id", T::String),
    tag(48, "Rotation file ID", "rotfile_id", T::U32),
    tag(49, "Rotation file name", "rotfile_name", T::String),
    tag(50, "Device name", "dev_name", T::String),
    tag(51, "Device path", "dev_path", T::String),
    tag(52, "Location description", "loc_descr", T::String),
    tag(53, "Application version", "app_version", T::String),
    tag(54, "CPU affinity", "cpu_affinity", T::String),
    tag(55, "CPU", "cpu", T::String),
    tag(56, "CPU physical cores", "cpu_phys_cores", T::U32),
    tag(57, "CPU NUMA nodes", "cpu_numa_nodes", T::U32),
    tag(58, "DAG attribute", "dag_attribute", T::Binary),
    tag(59, "DAG version", "dag_version", T::String),
    tag(60, "Stream flags", "stream_flags", T::Bitfield32).with_subfields(STREAM_FLAGS),
    tag(61, "Entropy threshold", "entropy_threshold", T::U32),
    tag(62, "Smart truncation default", "smart_trunc_default", T::U32),
    tag(63, "Extension headers added", "ext_hdrs_added", T::Bitfield32).with_subfields(EXT_HDRS),
    tag(64, "Extension headers removed", "ext_hdrs_removed", T::Bitfield32)
        .with_subfields(EXT_HDRS),
    tag(65, "Relative snap length", "relative_snaplen", T::U32),
    tag(66, "Temperature", "temperature", T::Temperature),
    tag(67, "Power", "power", T::Power),
    tag(68, "Vendor", "vendor", T::String),
    tag(69, "CPU threads", "cpu_threads", T::U32),
    // interface
    tag(0x0100, "Interface number", "if_num", T::U32),
    tag(0x0101, "Interface virtual circuit", "if_vc", T::U32),
    tag(0x0102, "Interface color", "if_color", T::U32),
    tag(0x0103, "Interface snap length", "if_snaplen", T::U32),
    tag(0x0104, "Interface FCS length", "if_fcs", T::U32),
    tag(0x0105, "Interface speed", "if_speed", T::Rate),
    tag(0x0106, "Interface transmit speed", "if_tx_speed", T::Rate),
    tag(0x0107, "Interface MAC address", "if_mac", T::Addr(A::Mac)),
    tag(0x0108, "Interface EUI-64", "if_eui", T::Addr(A::Eui)),
    tag(0x0109, "Interface InfiniBand GID", "if_ib_gid", T::Addr(A::IbGid)),
    tag(0x010a, "Interface InfiniBand LID", "if_ib_lid", T::Addr(A::IbLid)),
    tag(0x010b, "Interface WWN", "if_wwn", T::Addr(A::Wwn)),
    tag(0x010c, "Interface FC ID", "if_fc_id", T::Addr(A::FcId)),
    tag(0x010d, "Interface transmit power", "if_tx_power", T::Power),
    tag(0x010e, "Interface receive power", "if_rx_power", T::Power),
    tag(0x010f, "Interface SFP type", "if_sfp_type", T::String),
    tag(0x0110, "Interface link status", "if_link_status", T::Bitfield32)
        .with_subfields(IF_LINK_STATUS),
    tag(0x0111, "Interface PHY mode", "if_phy_mode", T::U32).with_labels(IF_PHY_MODE),
    tag(0x0112, "Interface port type", "if_port_type", T::U32).with_labels(IF_PORT_TYPE),
    tag(0x0113, "Interface receive latency", "if_rx_latency", T::DurationNs),
    tag(0x0114, "Interface IPv4 address", "if_ipv4", T::Addr(A::Ipv4)),
    tag(0x0115, "Interface IPv6 address", "if_ipv6", T::Addr(A::Ipv6)),
    tag(0x0116, "Interface temperature", "if_temperature", T::Temperature),
    tag(0x0117, "Interface receive SFP flags", "if_rx_sfp_flags", T::Bitfield32)
        .with_subfields(IF_RX_SFP_FLAGS),
    // flow
    tag(0x0140, "Source MAC address", "src_mac", T::Addr(A::Mac)),
    tag(0x0141, "Destination MAC address", "dest_mac", T::Addr(A::Mac)),
    tag(0x0142, "Source IPv4 address", "src_ipv4", T::Addr(A::Ipv4)),
    tag(0x0143, "Destination IPv4 address", "dest_ipv4", T::Addr(A::Ipv4)),
    tag(0x0144, "Source IPv6 address", "src_ipv6", T::Addr(A::Ipv6)),
    tag(0x0145, "Destination IPv6 address", "dest_ipv6", T::Addr(A::Ipv6)),
    tag(0x0146, "Source port", "src_port", T::U16),
    tag(0x0147, "Destination port", "dest_port", T::U16),
    tag(0x0148, "IP protocol", "ip_proto", T::U8).with_labels(IP_PROTO),
    tag(0x0149, "Flow hash", "flow_hash", T::U32),
    tag(0x014a, "Filter match", "filter_match", T::U32),
    tag(0x014b, "Filter match name", "filter_match_name", T::String),
    tag(0x014c, "Error flags", "error_flags", T::U32),
    tag(0x014d, "Initiator packets", "initiator_pkts", T::U64),
    tag(0x014e, "Responder packets", "responder_pkts", T::U64),
    tag(0x014f, "Initiator bytes", "initiator_bytes", T::U64),
    tag(0x0150, "Responder bytes", "responder_bytes", T::U64),
    tag(0x0151, "Initiator minimum entropy", "initiator_min_entropy", T::U32),
    tag(0x0152, "Responder minimum entropy", "responder_min_entropy", T::U32),
    tag(0x0153, "DPI application", "dpi_application", T::String),
    tag(0x0154, "DPI confidence", "dpi_confidence", T::U32),
    tag(0x0155, "DPI state", "dpi_state", T::U32).with_labels(DPI_STATE),
    tag(0x0156, "DPI protocol stack", "dpi_protocol_stack", T::String),
    tag(0x0157, "Flow state", "flow_state", T::U32).with_labels(FLOW_STATE),
    tag(0x0158, "Flow start", "flow_start", T::ErfTime),
    tag(0x0159, "Flow end", "flow_end", T::ErfTime),
    // statistics
    tag(0x0180, "Start time", "start_time", T::ErfTime),
    tag(0x0181, "End time", "end_time", T::ErfTime),
    tag(0x0182, "Interface drop", "stat_if_drop", T::U64),
    tag(0x0183, "Received frames", "stat_frames", T::U64),
    tag(0x0184, "Received bytes", "stat_bytes", T::U64),
    tag(0x0185, "Captured frames", "stat_cap", T::U64),
    tag(0x0186, "Captured bytes", "stat_cap_bytes", T::U64),
    tag(0x0187, "OS drop", "stat_os_drop", T::U64),
    tag(0x0188, "Data stream loss counter", "stat_ds_lctr", T::U64),
    tag(0x0189, "Filter match count", "stat_filter_match", T::U64),
    tag(0x018a, "Filter drop", "stat_filter_drop", T::U64),
    tag(0x018b, "Too short", "stat_too_short", T::U64),
    tag(0x018c, "Too long", "stat_too_long", T::U64),
    tag(0x018d, "Receive error", "stat_rx_error", T::U64),
    tag(0x018e, "FCS error", "stat_fcs_error", T::U64),
    tag(0x018f, "Aborted", "stat_aborted", T::U64),
    tag(0x0190, "Processing drop", "stat_proc_drop", T::U64),
    tag(0x0191, "Stream drop", "stat_stream_drop", T::U64),
    tag(0x0192, "Stream buffer drop", "stat_stream_buf_drop", T::U64),
    tag(0x0193, "Memory drop", "stat_mem_drop", T::U64),
    tag(0x0194, "Statistics duration", "stat_dur", T::DurationNs),
    // name service
    tag(0x01c0, "DNS IPv4 address", "ns_dns_ipv4", T::Addr(A::Ipv4)),
    tag(0x01c1, "DNS IPv6 address", "ns_dns_ipv6", T::Addr(A::Ipv6)),
    tag(0x01c2, "IPv4 host", "ns_host_ipv4", T::NameService(A::Ipv4)),
    tag(0x01c3, "IPv6 host", "ns_host_ipv6", T::NameService(A::Ipv6)),
    tag(0x01c4, "MAC host", "ns_host_mac", T::NameService(A::Mac)),
    tag(0x01c5, "EUI-64 host", "ns_host_eui", T::NameService(A::Eui)),
    tag(0x01c6, "InfiniBand GID host", "ns_host_ib_gid", T::NameService(A::IbGid)),
    tag(0x01c7, "InfiniBand LID host", "ns_host_ib_lid", T::NameService(A::IbLid)),
    tag(0x01c8, "WWN host", "ns_host_wwn", T::NameService(A::Wwn)),
    tag(0x01c9, "FC ID host", "ns_host_fc_id", T::NameService(A::FcId)),
    // PTP
    tag(0x0200, "PTP domain number", "ptp_domain_num", T::U32),
    tag(0x0201, "PTP steps removed", "ptp_steps_removed", T::U32),
    tag(0x0202, "PTP offset from master", "ptp_offset_from_master", T::PtpTimeInterval),
    tag(0x0203, "PTP mean path delay", "ptp_mean_path_delay", T::PtpTimeInterval),
    tag(0x0204, "PTP parent identity", "ptp_parent_identity", T::Addr(A::Eui)),
    tag(0x0205, "PTP parent port number", "ptp_parent_port_num", T::U32),
    tag(0x0206, "PTP grandmaster identity", "ptp_gm_identity", T::Addr(A::Eui)),
    tag(0x0207, "PTP grandmaster clock quality", "ptp_gm_clock_quality", T::Bitfield32)
        .with_subfields(PTP_GM_CLOCK_QUALITY),
    tag(0x0208, "PTP current UTC offset", "ptp_current_utc_offset", T::I32),
    tag(0x0209, "PTP time properties", "ptp_time_properties", T::Bitfield32)
        .with_subfields(PTP_TIME_PROPERTIES),
    tag(0x020a, "PTP time source", "ptp_time_source", T::U32).with_labels(PTP_TIME_SOURCE),
    tag(0x020b, "PTP clock identity", "ptp_clock_identity", T::Addr(A::Eui)),
    tag(0x020c, "PTP port number", "ptp_port_num", T::U32),
    tag(0x020d, "PTP port state", "ptp_port_state", T::U32).with_labels(PTP_PORT_STATE),
    tag(0x020e, "PTP delay mechanism", "ptp_delay_mechanism", T::U32)
        .with_labels(PTP_DELAY_MECHANISM),
    tag(0x020f, "PTP time", "ptp_time", T::PtpTime),
    tag(0x0220, "Clock port protocol", "clk_port_proto", T::U32).with_labels(CLK_PORT_PROTO),
];

/// Find the template of a section code
pub fn section_template(code: u16) -> Option<&'static MetaSectionTemplate> {
    META_SECTIONS.iter().find(|s| s.code == code)
}
