//! Tile and System Construction Tests.

use tilesim_core::soc::{System, Tile};

use crate::common::harness::small_config;

#[test]
fn tile_power_switch_counts_downs() {
    let tile = Tile::new(3, 0, 3);
    assert!(tile.is_powered());
    tile.power_down();
    assert!(!tile.is_powered());
    tile.power_up();
    assert!(tile.is_powered());
    assert_eq!(tile.power_downs(), 1);
}

#[test]
fn system_attaches_one_tile_per_processor() {
    let mut config = small_config();
    config.system.tiles = 20;
    let system = System::new(config).unwrap();
    assert_eq!(system.tile_count(), 20);
    let tile = system.tile(17).unwrap();
    assert_eq!((tile.id(), tile.leaf(), tile.port()), (17, 1, 1));
    assert!(system.tile(20).is_none());
    assert!(system.processor(20).is_err());
}

#[test]
fn virtual_seeding_round_trips() {
    let system = System::new(small_config()).unwrap();
    system.write_virtual(0x3FE, b"span").unwrap();
    let mut buf = [0u8; 4];
    system.read_virtual(0x3FE, &mut buf).unwrap();
    assert_eq!(&buf, b"span");
    assert!(system.lookup(0x3FE).unwrap().is_some());
    assert!(system.lookup(0x10_0000).unwrap().is_none());
}
