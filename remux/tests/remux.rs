use std::io::Write;
use std::sync::{Arc, Mutex};

use giztoy_remux::ebml::ids;
use giztoy_remux::ogg::{crc32, read_pages, Page};
use giztoy_remux::opus::OpusHead;
use giztoy_remux::{parse_webm, remux, ParsePolicy, RemuxError, RemuxOptions, Remuxer};

const PACKET: [u8; 5] = [0xFC, 0x00, 0x01, 0x02, 0x03];

fn id_bytes(id: u32) -> Vec<u8> {
    let skip = (id.leading_zeros() / 8) as usize;
    id.to_be_bytes()[skip..].to_vec()
}

fn element(id: u32, payload: &[u8]) -> Vec<u8> {
    let mut out = id_bytes(id);
    out.push(0x01);
    out.extend_from_slice(&(payload.len() as u64).to_be_bytes()[1..]);
    out.extend_from_slice(payload);
    out
}

fn unknown_size(id: u32, payload: &[u8]) -> Vec<u8> {
    let mut out = id_bytes(id);
    out.extend_from_slice(&[0x01, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]);
    out.extend_from_slice(payload);
    out
}

fn simple_block(track: u8, flags: u8, frame: &[u8]) -> Vec<u8> {
    let mut payload = vec![0x80 | track, 0x00, 0x00, flags];
    payload.extend_from_slice(frame);
    element(ids::SIMPLE_BLOCK, &payload)
}

fn tracks() -> Vec<u8> {
    let mut audio = element(ids::CHANNELS, &[1]);
    audio.extend(element(ids::SAMPLING_FREQUENCY, &48000.0f64.to_be_bytes()));
    let mut entry = element(ids::TRACK_NUMBER, &[1]);
    entry.extend(element(ids::TRACK_TYPE, &[2]));
    entry.extend(element(ids::CODEC_ID, b"A_OPUS"));
    entry.extend(element(ids::AUDIO, &audio));
    element(ids::TRACKS, &element(ids::TRACK_ENTRY, &entry))
}

fn ebml_header() -> Vec<u8> {
    element(ids::EBML, &element(0x4282, b"webm"))
}

fn webm(blocks: &[u8]) -> Vec<u8> {
    let mut segment = tracks();
    segment.extend(element(ids::CLUSTER, blocks));
    let mut buf = ebml_header();
    buf.extend(element(ids::SEGMENT, &segment));
    buf
}

/// A recording of `n` 20 ms packets split over clusters of 25 blocks.
fn recording(n: usize) -> Vec<u8> {
    let mut segment = tracks();
    for chunk in (0..n).collect::<Vec<_>>().chunks(25) {
        let mut blocks = element(ids::TIMECODE, &[0x00]);
        for &i in chunk {
            blocks.extend(simple_block(1, 0x80, &[0xFC, (i % 256) as u8, 0x55]));
        }
        segment.extend(element(ids::CLUSTER, &blocks));
    }
    let mut buf = ebml_header();
    buf.extend(element(ids::SEGMENT, &segment));
    buf
}

/// Checks the page-level invariants every remuxed stream must hold.
fn assert_valid_stream(pages: &[Page]) {
    assert!(pages.len() >= 3);

    for (i, page) in pages.iter().enumerate() {
        assert_eq!(page.sequence, i as u32, "sequence gap at page {}", i);
        assert_eq!(page.serial, pages[0].serial);
        assert_eq!(page.version, 0);
        assert!(page.verify_crc(), "bad CRC on page {}", i);

        let sum: usize = page.segment_table.iter().map(|&s| s as usize).sum();
        assert_eq!(sum, page.body.len());
    }

    assert!(pages[0].is_bos());
    assert_eq!(pages.iter().filter(|p| p.is_bos()).count(), 1);
    assert_eq!(&pages[0].body[..8], b"OpusHead");
    assert_eq!(&pages[1].body[..8], b"OpusTags");

    assert_eq!(pages.iter().filter(|p| p.is_eos()).count(), 1);
    assert!(pages.last().unwrap().is_eos());

    for pair in pages.windows(2) {
        assert!(pair[0].granule_position <= pair[1].granule_position);
    }
}

#[test]
fn pass_through_is_identity() {
    let input = b"OggS\x00\x02\x00\x00 anything goes after the magic".to_vec();
    let out = remux(&input).unwrap();
    assert!(out.is_pass_through());
    assert_eq!(&out.data[..], &input[..]);
}

#[test]
fn no_frames_is_an_error() {
    for input in [vec![0u8; 256], ebml_header(), webm(&[])] {
        assert!(matches!(remux(&input), Err(RemuxError::NoFramesFound)));
    }
}

#[test]
fn single_packet_scenario() {
    let input = webm(&simple_block(1, 0x80, &PACKET));
    let out = remux(&input).unwrap();
    assert_eq!(out.content_type(), "audio/ogg");

    let pages = read_pages(&out.data).unwrap();
    assert_valid_stream(&pages);
    assert_eq!(pages.len(), 3);
    assert_eq!(pages[2].granule_position, 960);
    assert_eq!(pages[2].packets(), vec![&PACKET[..]]);

    let head = OpusHead::parse(&pages[0].body).unwrap();
    assert_eq!(head.version, 1);
    assert_eq!(head.channels, 1);
    assert_eq!(head.pre_skip, 312);
    assert_eq!(head.input_sample_rate, 48000);
}

#[test]
fn long_recording_round_trips_packets() {
    let input = recording(237);
    let out = remux(&input).unwrap();
    let pages = read_pages(&out.data).unwrap();
    assert_valid_stream(&pages);

    let packets: Vec<&[u8]> = pages[2..].iter().flat_map(|p| p.packets()).collect();
    assert_eq!(packets.len(), 237);
    for (i, packet) in packets.iter().enumerate() {
        assert_eq!(*packet, &[0xFC, (i % 256) as u8, 0x55][..]);
    }
    assert_eq!(pages.last().unwrap().granule_position, 237 * 960);
    assert_eq!(out.granule, 237 * 960);
    assert_eq!(out.pages as usize, pages.len());
}

#[test]
fn crc_matches_manual_recompute() {
    let input = recording(10);
    let out = remux(&input).unwrap();
    let mut offset = 0;
    for page in read_pages(&out.data).unwrap() {
        let len = page.len();
        let mut bytes = out.data[offset..offset + len].to_vec();
        bytes[22..26].fill(0);
        assert_eq!(crc32(&bytes), page.checksum);
        offset += len;
    }
    assert_eq!(offset, out.data.len());
}

#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<u8>>>);

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
fn laced_block_warns_and_continues() {
    let input = webm(&simple_block(1, 0x06, &PACKET));

    let capture = Capture::default();
    let writer = capture.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .finish();

    let out = tracing::subscriber::with_default(subscriber, || remux(&input)).unwrap();

    let logs = String::from_utf8(capture.0.lock().unwrap().clone()).unwrap();
    assert!(logs.contains("laced SimpleBlock detected"), "logs: {}", logs);

    let pages = read_pages(&out.data).unwrap();
    assert_valid_stream(&pages);
    assert_eq!(pages[2].packets(), vec![&PACKET[..]]);
    assert_eq!(parse_webm(&input).laced_blocks, 1);
}

#[test]
fn unknown_size_masters_are_fully_traversed() {
    let mut segment = tracks();
    for _ in 0..2 {
        let mut blocks = element(ids::TIMECODE, &[0x00]);
        for _ in 0..3 {
            blocks.extend(simple_block(1, 0x80, &PACKET));
        }
        segment.extend(element(ids::CLUSTER, &blocks));
    }
    let mut last = Vec::new();
    for _ in 0..4 {
        last.extend(simple_block(1, 0x80, &PACKET));
    }
    segment.extend(unknown_size(ids::CLUSTER, &last));

    let mut input = ebml_header();
    input.extend(unknown_size(ids::SEGMENT, &segment));

    let out = remux(&input).unwrap();
    let pages = read_pages(&out.data).unwrap();
    assert_valid_stream(&pages);
    assert_eq!(pages.last().unwrap().granule_position, 10 * 960);
}

#[test]
fn strict_policy_rejects_truncated_input() {
    let mut input = recording(5);
    input.truncate(input.len() - 2);

    // Sizes running past the buffer are clamped to it.
    let lenient = remux(&input).unwrap();
    assert!(!read_pages(&lenient.data).unwrap().is_empty());

    let mut corrupt = recording(5);
    corrupt.extend_from_slice(&[0x00, 0x00]);
    assert!(remux(&corrupt).is_ok());

    let strict = Remuxer::new(RemuxOptions {
        parse_policy: ParsePolicy::Strict,
        ..Default::default()
    });
    assert!(matches!(strict.remux(&corrupt), Err(RemuxError::Truncated { .. })));
}

#[test]
fn hostile_nesting_does_not_overflow_the_stack() {
    let mut input = webm(&simple_block(1, 0x80, &PACKET));
    input.extend([0xA0u8, 0xFF].repeat(200_000));

    let (lenient, strict) = std::thread::Builder::new()
        .stack_size(512 * 1024)
        .spawn(move || {
            let lenient = remux(&input).map(|out| out.granule);
            let strict = Remuxer::new(RemuxOptions {
                parse_policy: ParsePolicy::Strict,
                ..Default::default()
            })
            .remux(&input)
            .map(|out| out.granule);
            (lenient, strict)
        })
        .unwrap()
        .join()
        .unwrap();

    assert_eq!(lenient.unwrap(), 960);
    match strict {
        Err(err @ RemuxError::Truncated { .. }) => {
            assert!(err.to_string().contains("nested too deep"), "{}", err);
        }
        other => panic!("expected truncation error, got {:?}", other),
    }
}

#[test]
fn blocks_of_other_tracks_are_dropped() {
    let mut blocks = simple_block(1, 0x80, &PACKET);
    blocks.extend(simple_block(2, 0x80, &[0x01, 0x02, 0x03]));
    blocks.extend(simple_block(1, 0x80, &PACKET));
    let input = webm(&blocks);

    let out = remux(&input).unwrap();
    let pages = read_pages(&out.data).unwrap();
    assert_eq!(pages[2].packets().len(), 2);

    let all = Remuxer::new(RemuxOptions {
        filter_audio_track: false,
        ..Default::default()
    })
    .remux(&input)
    .unwrap();
    let pages = read_pages(&all.data).unwrap();
    assert_eq!(pages[2].packets().len(), 3);
}

#[test]
fn remuxer_is_shareable_across_threads() {
    let remuxer = Arc::new(Remuxer::default());
    let handles: Vec<_> = (0..4)
        .map(|n| {
            let remuxer = Arc::clone(&remuxer);
            std::thread::spawn(move || {
                let input = recording(10 + n);
                let out = remuxer.remux(&input).unwrap();
                read_pages(&out.data).unwrap().len()
            })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), 3);
    }
}
