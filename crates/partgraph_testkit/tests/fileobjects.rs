//! Write-frame and read-view scenarios against a real directory.

use bytes::Bytes;
use partgraph_storage::{FrameState, ReadView, StorageError, WriteFrame};
use partgraph_testkit::{random_bytes, TestStore};

const EXP_WRITE_COUNT: u32 = 15;
const NUM_BYTES: usize = 1 << EXP_WRITE_COUNT;
const READ_PARTIAL: usize = 4567;

#[test]
fn exponential_writes_concatenate() {
    let store = TestStore::new();
    let bits = random_bytes(NUM_BYTES, 1);

    let mut frame = WriteFrame::new(store.backend());
    frame.init().unwrap();
    let mut running = 0usize;
    for i in 0..EXP_WRITE_COUNT {
        let len = 1usize << i;
        frame.write(&bits[running..running + len]).unwrap();
        running += len;
    }
    frame.bind("exponential").unwrap();
    frame.persist().unwrap();

    assert_eq!(store.backend.stat("exponential").unwrap().size, running as u64);

    let mut view = ReadView::new(store.backend());
    view.bind("exponential").unwrap();
    let read = view.read(running).unwrap();
    assert_eq!(read.len(), running);
    assert_eq!(&read[..], &bits[..running]);
}

#[test]
fn the_big_one_partial_read() {
    let store = TestStore::new();
    let bits = random_bytes(NUM_BYTES, 2);

    let mut frame = WriteFrame::new(store.backend());
    frame.init().unwrap();
    frame.write(&bits).unwrap();
    frame.bind("the-big-one").unwrap();
    frame.persist().unwrap();

    assert_eq!(store.backend.stat("the-big-one").unwrap().size, NUM_BYTES as u64);

    let mut view = ReadView::new(store.backend());
    view.bind("the-big-one").unwrap();
    let mut dst = vec![0u8; NUM_BYTES];
    let n = view.read_into(&mut dst[..READ_PARTIAL]).unwrap();
    assert_eq!(n, READ_PARTIAL);
    assert_eq!(&dst[..READ_PARTIAL], &bits[..READ_PARTIAL]);
    assert_eq!(view.tell().unwrap(), READ_PARTIAL as u64);
}

#[test]
fn silly_persist_seek_and_close() {
    let store = TestStore::new();
    let bits = random_bytes(NUM_BYTES, 3);

    let mut frame = WriteFrame::new(store.backend());
    frame.init_with_capacity(NUM_BYTES * 2).unwrap();
    assert!(matches!(
        frame.persist(),
        Err(StorageError::PersistWithoutDestination)
    ));

    frame.write_buf(Bytes::from(bits.clone())).unwrap();
    assert!(frame.persist().is_err());
    frame.bind("silly").unwrap();
    frame.persist().unwrap();
    assert_eq!(frame.state(), FrameState::Persisted);

    assert_eq!(store.backend.stat("silly").unwrap().size, NUM_BYTES as u64);

    let mut view = ReadView::new(store.backend());
    assert!(view.bind("sillynot-a-file").is_err());
    assert!(!view.is_bound());
    view.bind("silly").unwrap();

    let tail = (NUM_BYTES - READ_PARTIAL) as u64;
    view.seek(tail).unwrap();
    assert_eq!(view.tell().unwrap(), tail);

    let rest = view.read(NUM_BYTES).unwrap();
    assert_eq!(rest.len(), READ_PARTIAL);
    assert_eq!(&rest[..], &bits[NUM_BYTES - READ_PARTIAL..]);

    view.close().unwrap();
    assert!(view.is_closed());
    frame.close().unwrap();
    assert!(frame.is_closed());
}

#[test]
fn short_reads_are_retried_through_views() {
    let bits = random_bytes(10_000, 4);
    let backend = partgraph_testkit::short_read_backend(7);
    backend.put("obj", &bits).unwrap();

    let mut view = ReadView::new(backend);
    view.bind("obj").unwrap();
    view.seek(100).unwrap();
    let read = view.read(5_000).unwrap();
    assert_eq!(&read[..], &bits[100..5_100]);

    let mut dst = [0u8; 333];
    view.read_exact_at(9_000, &mut dst).unwrap();
    assert_eq!(&dst[..], &bits[9_000..9_333]);
    assert_eq!(view.tell().unwrap(), 5_100);
}
