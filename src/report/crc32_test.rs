use super::crc32::{crc32, BT_CRC_SEED};

#[test]
fn empty_input_returns_the_seed() {
    assert_eq!(crc32(BT_CRC_SEED, &[]), BT_CRC_SEED);
}

#[test]
fn known_vectors() {
    let data: Vec<u8> = (0x00..=0x0F).collect();
    assert_eq!(crc32(BT_CRC_SEED, &data), 0x4732_7AE0);

    let data = [0x02, 0x03, 0x14, 0x27, 0xFF, 0x00, 0x10];
    assert_eq!(crc32(BT_CRC_SEED, &data), 0x0A87_012D);
}

#[test]
fn fold_is_incremental() {
    let data = [0x02, 0x03, 0x14, 0x27, 0xFF, 0x00, 0x10];
    let split = crc32(crc32(BT_CRC_SEED, &data[..3]), &data[3..]);
    assert_eq!(split, crc32(BT_CRC_SEED, &data));
}
