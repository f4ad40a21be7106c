use erf_parser::traits::ErfReaderIterator;
use erf_parser::*;
use std::env;
use std::error::Error;
use std::fs::{self, File};

fn main() {
    for arg in env::args().skip(1) {
        if let Err(e) = print_erf_info(&arg) {
            eprintln!("{}: {}", arg, e);
        }
    }
}

fn print_erf_info(arg: &str) -> Result<(), Box<dyn Error>> {
    println!("Name: {}", arg);

    let mut file = File::open(arg)?;
    let file_size = file.metadata()?.len();
    println!("\tfile size: {}", file_size);

    match sniff_reader(&mut file) {
        Ok(sniff) => {
            println!("\tformat: container");
            println!(
                "\tversion: {}.{}",
                sniff.header.version_major, sniff.header.version_minor
            );
            println!("\tData Link Type: {}", sniff.header.network);
            println!(
                "\tframe layout: {:?}{}",
                sniff.layout,
                if sniff.ambiguous { " (ambiguous)" } else { "" }
            );
            drop(file);
            let data = fs::read(arg)?;
            let cap = ErfCapture::from_container(&data, ErfConfig::default())
                .map_err(|e| e.to_owned_vec())?;
            for record in cap.iter() {
                match record {
                    Ok(record) => print_record_info(&record),
                    Err(e) => println!("\t\t{}", e),
                }
            }
            println!("\tnum_records: {}", cap.len());
        }
        // too short for a container header: try it as a native stream
        Err(ErfError::HeaderNotRecognized) | Err(ErfError::Incomplete(_)) => {
            println!("\tformat: native ERF");
            let mut reader = ErfReader::new(65536, file)?;
            let mut num_records = 0;
            loop {
                match reader.next() {
                    Ok((offset, record)) => {
                        print_record_info(&record);
                        num_records += 1;
                        reader.consume(offset);
                    }
                    Err(ErfError::Eof) => break,
                    Err(ErfError::Incomplete(_)) => {
                        reader.refill().map_err(|e| e.to_owned_vec())?;
                    }
                    Err(e) => return Err(e.to_owned_vec().into()),
                }
            }
            println!("\tnum_records: {}", num_records);
            let session = reader.session();
            if let Some(host_id) = session.implicit_host_id() {
                println!("\timplicit host id: {:012x}", host_id);
            }
            for key in session.index().keys() {
                println!(
                    "\thost {:012x} source {}: {} metadata records",
                    key.host_id,
                    key.source_id,
                    session.index().positions(*key).len()
                );
            }
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}

fn print_record_info(record: &ErfRecord) {
    println!(
        "\t\t{} {:?} rlen={} wlen={} payload={}",
        record.header.ts,
        record.erf_type(),
        record.header.rlen,
        record.header.wlen,
        record.payload.len()
    );
    for w in &record.warnings {
        println!("\t\t\twarning: {:?}", w);
    }
    if let Some(meta) = &record.meta {
        for (index, section) in meta.sections.iter().enumerate() {
            println!(
                "\t\t\tsection 0x{:04x} id {:?}",
                section.code, section.id
            );
            for entry in meta.section_entries(index) {
                match &entry.value {
                    Some(v) => println!("\t\t\t\t{}: {}", entry.info.name, v),
                    None => println!("\t\t\t\t{}: <no value>", entry.info.name),
                }
            }
        }
        for w in &meta.warnings {
            println!("\t\t\twarning at {}: {:?}", w.offset, w.kind);
        }
    }
}
