use super::*;
use crate::conf::{ByteOrder, MAX_ISNULL_ALIGNMENT};
use crate::proto::EncodingKind;
use crate::stats::StatsRecorder;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn init_log() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn long_chunk_writer(option: &WriterOption) -> ColumnChunkWriter {
    ColumnChunkWriter::new(&TypeDescription::long(), option).unwrap()
}

// Write one row to chunk writer in the same way as IntegerColumnWriter,
// returns true if the pixel reaches the stride.
fn put_row(writer: &mut ColumnChunkWriter, value: Option<i64>) -> bool {
    match value {
        Some(v) => {
            let order = writer.byte_order();
            writer.output_mut().put_i64(v, order);
            writer.pixel_stat_recorder_mut().update_integer(v);
            writer.append_is_null(false);
        }
        None => writer.append_is_null(true),
    }
    writer.is_pixel_full()
}

fn random_row(rng: &mut ChaCha8Rng) -> Option<i64> {
    if rng.random_bool(0.2) {
        None
    } else {
        Some(rng.random_range(-1000..1000))
    }
}

#[test]
fn test_pixel_position_parity() {
    init_log();
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let option = WriterOption::default().pixel_stride(7);
    let mut writer = long_chunk_writer(&option);
    // write offsets observed at each pixel boundary.
    let mut boundaries = vec![];
    for _ in 0..100 {
        if put_row(&mut writer, random_row(&mut rng)) {
            writer.new_pixel();
            boundaries.push(writer.output().write_pos() as u64);
            let index = writer.column_chunk_index();
            assert_eq!(index.pixel_positions.len(), index.pixel_statistics.len());
            assert_eq!(index.pixel_positions.len(), boundaries.len());
        }
    }
    let index = writer.column_chunk_index();
    assert_eq!(index.pixel_positions[0], 0);
    for i in 1..index.pixel_positions.len() {
        assert_eq!(index.pixel_positions[i], boundaries[i - 1]);
    }
    assert_eq!(writer.last_pixel_position() as u64, *boundaries.last().unwrap());
    assert_eq!(writer.cur_pixel_ele_index(), 100 % 7);
}

#[test]
fn test_isnull_alignment() {
    init_log();
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    for alignment in [0usize, 1, 3, 4, 8, 64, MAX_ISNULL_ALIGNMENT] {
        for _ in 0..10 {
            let option = WriterOption::default()
                .pixel_stride(16)
                .isnull_alignment(alignment);
            let mut writer =
                ColumnChunkWriter::new(&TypeDescription::new(TypeKind::Byte), &option).unwrap();
            let rows = rng.random_range(1..100);
            for _ in 0..rows {
                let is_null = rng.random_bool(0.3);
                if !is_null {
                    writer.output_mut().put_u8(1);
                    writer.pixel_stat_recorder_mut().update_integer(1);
                }
                writer.append_is_null(is_null);
                if writer.is_pixel_full() {
                    writer.new_pixel();
                }
            }
            let raw_offset = writer.output().write_pos() as u64;
            writer.flush();
            let index = writer.column_chunk_index();
            if alignment == 0 {
                assert_eq!(index.is_null_offset, raw_offset);
            } else {
                assert_eq!(index.is_null_offset % alignment as u64, 0);
                assert!(index.is_null_offset - raw_offset < alignment as u64);
            }
            let content = writer.column_chunk_content();
            assert_eq!(
                content.len(),
                index.is_null_offset as usize + writer.is_null_stream().len()
            );
            assert!(
                content[raw_offset as usize..index.is_null_offset as usize]
                    .iter()
                    .all(|b| *b == 0)
            );
        }
    }
}

#[test]
fn test_bitmap_omission() {
    init_log();
    let option = WriterOption::default().pixel_stride(20);
    let mut writer = long_chunk_writer(&option);
    for n in 1..=20usize {
        // pixel without null emits no bitmap bytes.
        let before = writer.is_null_stream().len();
        for i in 0..n {
            put_row(&mut writer, Some(i as i64));
        }
        writer.new_pixel();
        assert_eq!(writer.is_null_stream().len(), before);

        // pixel with nulls emits ceil(n/8) bytes.
        let before = writer.is_null_stream().len();
        for i in 0..n {
            let v = if i % 3 == 0 { None } else { Some(i as i64) };
            put_row(&mut writer, v);
        }
        writer.new_pixel();
        assert_eq!(writer.is_null_stream().len() - before, n.div_ceil(8));
    }
    let index = writer.column_chunk_index();
    assert_eq!(index.pixel_count(), 40);
    for (i, ps) in index.pixel_statistics.iter().enumerate() {
        assert_eq!(ps.statistic.has_null, i % 2 == 1);
    }
}

#[test]
fn test_bitmap_big_endian() {
    let option = WriterOption::default()
        .pixel_stride(10)
        .byte_order(ByteOrder::BigEndian)
        .isnull_alignment(0);
    let mut writer = long_chunk_writer(&option);
    for v in [None, Some(1), Some(2), Some(3), Some(4), Some(5), Some(6), Some(7), None] {
        put_row(&mut writer, v);
    }
    writer.flush();
    assert_eq!(writer.is_null_stream().as_slice(), &[0b1000_0000, 0b1000_0000]);
    assert!(!writer.column_chunk_index().little_endian);
}

#[test]
fn test_reset_idempotence() {
    init_log();
    let option = WriterOption::default()
        .pixel_stride(3)
        .nulls_padding(true)
        .isnull_alignment(4);
    let mut writer = long_chunk_writer(&option);
    for v in [Some(1), None, Some(3), Some(4)] {
        if put_row(&mut writer, v) {
            writer.new_pixel();
        }
    }
    writer.flush();
    assert!(writer.column_chunk_size() > 0);

    writer.reset();
    let index = writer.column_chunk_index().clone();
    assert!(index.pixel_positions.is_empty());
    assert!(index.pixel_statistics.is_empty());
    assert_eq!(index.is_null_offset, 0);
    // chunk-wide flags are restored as after construction.
    assert_eq!(&index, long_chunk_writer(&option).column_chunk_index());
    assert!(writer.pixel_stat_recorder().is_empty());
    assert!(writer.column_chunk_stat_recorder().is_empty());
    assert_eq!(writer.column_chunk_stat(), &ColumnStatistic::default());
    assert_eq!(writer.column_chunk_size(), 0);
    assert!(writer.is_null_stream().is_empty());
    assert_eq!(writer.last_pixel_position(), 0);
    assert_eq!(writer.cur_pixel_position(), 0);

    writer.reset();
    assert_eq!(writer.column_chunk_index(), &index);
    assert!(writer.pixel_stat_recorder().is_empty());
    assert!(writer.column_chunk_stat_recorder().is_empty());
    assert_eq!(writer.column_chunk_size(), 0);

    // writer is reusable for next chunk.
    put_row(&mut writer, Some(9));
    writer.flush();
    assert_eq!(writer.column_chunk_index().pixel_positions, vec![0]);
    assert_eq!(writer.column_chunk_index().is_null_offset, 8);
    assert_eq!(writer.column_chunk_size(), 8);
}

#[test]
fn test_chunk_stats_merge_grouping() {
    init_log();
    let mut rng = ChaCha8Rng::seed_from_u64(0xabcd);
    let option = WriterOption::default().pixel_stride(5);
    let mut writer = long_chunk_writer(&option);
    let ty = TypeDescription::long();
    let mut pixels = vec![];
    for _ in 0..3 {
        let mut p = StatsRecorder::for_type(&ty);
        for _ in 0..5 {
            let v = random_row(&mut rng);
            match v {
                Some(v) => p.update_integer(v),
                None => p.set_has_null(),
            }
            put_row(&mut writer, v);
        }
        writer.new_pixel();
        pixels.push(p);
    }

    let mut left = pixels[0].clone();
    left.merge(&pixels[1]);
    left.merge(&pixels[2]);

    let mut tail = pixels[1].clone();
    tail.merge(&pixels[2]);
    let mut right = pixels[0].clone();
    right.merge(&tail);

    assert_eq!(left, right);
    assert_eq!(writer.column_chunk_stat_recorder(), &left);
    for (p, ps) in pixels.iter().zip(&writer.column_chunk_index().pixel_statistics) {
        assert_eq!(p.serialize(), ps.statistic);
    }
}

#[test]
fn test_end_to_end_pixel_boundaries() {
    init_log();
    let option = WriterOption::default()
        .pixel_stride(2)
        .byte_order(ByteOrder::LittleEndian)
        .isnull_alignment(4);
    let mut writer =
        new_column_writer(&TypeDescription::new(TypeKind::Byte), &option).unwrap();

    // second row is null, pixel is closed at the stride.
    writer.write(ColumnValues::Long(&[Some(1), None])).unwrap();
    let chunk = writer.chunk();
    assert_eq!(chunk.is_null_stream().as_slice(), &[0b0000_0010]);
    assert_eq!(chunk.cur_pixel_ele_index(), 0);
    assert_eq!(chunk.column_chunk_index().pixel_positions, vec![0]);
    assert_eq!(chunk.column_chunk_index().pixel_statistics.len(), 1);
    assert!(chunk.column_chunk_stat_recorder().has_null());
    assert_eq!(chunk.last_pixel_position(), 1);

    // partial pixel is closed by flush without bitmap bytes.
    writer.write(ColumnValues::Long(&[Some(3)])).unwrap();
    writer.flush().unwrap();
    let chunk = writer.chunk();
    assert_eq!(chunk.is_null_stream().len(), 1);
    let index = writer.column_chunk_index();
    assert_eq!(index.pixel_positions, vec![0, 1]);
    assert_eq!(index.pixel_statistics.len(), 2);
    assert!(index.pixel_statistics[0].statistic.has_null);
    assert!(!index.pixel_statistics[1].statistic.has_null);
    assert_eq!(index.is_null_offset, 4);
    assert!(index.little_endian);
    assert!(!index.nulls_padding);
    assert_eq!(index.is_null_alignment, 4);
    assert_eq!(writer.column_chunk_content(), &[1, 3, 0, 0, 0b0000_0010]);
    assert_eq!(writer.column_chunk_size(), 5);

    let stat = writer.column_chunk_stat();
    assert!(stat.has_null);
    assert_eq!(stat.number_of_values, 2);
    let s = stat.int_statistics.as_ref().unwrap();
    assert_eq!((s.minimum, s.maximum, s.sum), (Some(1), Some(3), Some(4)));
}

#[test]
fn test_flush_without_pending_pixel() {
    let option = WriterOption::default().pixel_stride(2).isnull_alignment(0);
    let mut writer = new_column_writer(&TypeDescription::long(), &option).unwrap();
    writer.write(ColumnValues::Long(&[Some(1), Some(2)])).unwrap();
    writer.flush().unwrap();
    assert_eq!(writer.column_chunk_index().pixel_count(), 1);
    assert_eq!(writer.column_chunk_size(), 16);

    let mut writer = new_column_writer(&TypeDescription::long(), &option).unwrap();
    writer.flush().unwrap();
    assert_eq!(writer.column_chunk_index().pixel_count(), 0);
    assert_eq!(writer.column_chunk_size(), 0);
}

#[test]
fn test_close() {
    init_log();
    let option = WriterOption::default();
    let mut writer = new_column_writer(&TypeDescription::double(), &option).unwrap();
    writer.write(ColumnValues::Double(&[Some(1.0)])).unwrap();
    writer.close();
    writer.close();
    assert!(writer.chunk().is_closed());
    assert_eq!(writer.column_chunk_size(), 0);
    assert_eq!(
        writer.write(ColumnValues::Double(&[Some(1.0)])),
        Err(Error::WriterClosed)
    );
    assert_eq!(writer.flush(), Err(Error::WriterClosed));
}

#[test]
fn test_new_column_writer() {
    let option = WriterOption::default();
    for input in [
        "boolean",
        "tinyint",
        "smallint",
        "int",
        "bigint",
        "float",
        "double",
        "string",
        "varchar(10)",
        "char(4)",
        "binary(8)",
        "varbinary(8)",
        "date",
        "time",
        "timestamp",
    ] {
        let ty = TypeDescription::parse(input).unwrap();
        let writer = new_column_writer(&ty, &option).unwrap();
        assert_eq!(writer.column_chunk_encoding().kind, EncodingKind::None);
        assert_eq!(writer.column_chunk_index().is_null_alignment, 8);
    }
    let ty = TypeDescription::decimal(10, 2).unwrap();
    assert!(matches!(
        new_column_writer(&ty, &option),
        Err(Error::DataTypeNotSupported)
    ));
    assert_eq!(
        ColumnChunkWriter::new_column_chunk_index(),
        ColumnChunkIndex::default()
    );
}

#[test]
fn test_reject_invalid_option() {
    let ty = TypeDescription::new(TypeKind::Byte);
    let option = WriterOption {
        isnull_alignment: MAX_ISNULL_ALIGNMENT * 2,
        ..WriterOption::default().pixel_stride(2)
    };
    assert!(matches!(
        new_column_writer(&ty, &option),
        Err(Error::InvalidConfig { .. })
    ));
    assert!(ColumnChunkWriter::new(&ty, &option).is_err());

    let option = WriterOption {
        pixel_stride: 0,
        ..WriterOption::default()
    };
    assert!(matches!(
        new_column_writer(&ty, &option),
        Err(Error::InvalidConfig { .. })
    ));
    assert!(BooleanColumnWriter::new(&TypeDescription::boolean(), &option).is_err());

    // largest alignment still pads from the shared buffer.
    let option = WriterOption::default()
        .pixel_stride(2)
        .isnull_alignment(MAX_ISNULL_ALIGNMENT);
    let mut writer = new_column_writer(&ty, &option).unwrap();
    writer.write(ColumnValues::Long(&[Some(1)])).unwrap();
    writer.flush().unwrap();
    assert_eq!(
        writer.column_chunk_index().is_null_offset,
        MAX_ISNULL_ALIGNMENT as u64
    );
    assert_eq!(writer.column_chunk_size(), MAX_ISNULL_ALIGNMENT);
}
