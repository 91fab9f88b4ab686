use super::*;

fn textures(alloc: &mut DescriptorAllocator, count: u32) -> Vec<u32> {
    (0..count)
        .map(|i| alloc.allocate(DescriptorKind::Texture2D, &format!("tex{}", i)).unwrap())
        .collect()
}

// ============================================================================
// Allocation order
// ============================================================================

#[test]
fn test_sequential_allocation() {
    let mut alloc = DescriptorAllocator::new(8);
    assert_eq!(textures(&mut alloc, 3), vec![0, 1, 2]);
    assert_eq!(alloc.len(), 3);
    assert_eq!(alloc.live_count(), 3);
    assert_eq!(alloc.first_free(), 3);
}

#[test]
fn test_new_is_empty() {
    let alloc = DescriptorAllocator::new(4);
    assert!(alloc.is_empty());
    assert_eq!(alloc.capacity(), 4);
    assert_eq!(alloc.first_free(), 0);
}

#[test]
fn test_freed_middle_slot_is_reused_with_new_kind() {
    let mut alloc = DescriptorAllocator::new(8);
    textures(&mut alloc, 3);
    alloc.free(1).unwrap();

    let index = alloc.allocate(DescriptorKind::Buffer, "lights").unwrap();
    assert_eq!(index, 1);
    let slot = alloc.slot(1).unwrap();
    assert_eq!(slot.kind, DescriptorKind::Buffer);
    assert_eq!(slot.debug_name, "lights");
}

#[test]
fn test_allocate_returns_lowest_free_index() {
    let mut alloc = DescriptorAllocator::new(8);
    textures(&mut alloc, 5);
    alloc.free(3).unwrap();
    alloc.free(1).unwrap();
    alloc.free(2).unwrap();
    assert_eq!(alloc.first_free(), 1);

    assert_eq!(alloc.allocate(DescriptorKind::Texture3D, "a").unwrap(), 1);
    assert_eq!(alloc.allocate(DescriptorKind::Texture3D, "b").unwrap(), 2);
    assert_eq!(alloc.allocate(DescriptorKind::Texture3D, "c").unwrap(), 3);
    assert_eq!(alloc.allocate(DescriptorKind::Texture3D, "d").unwrap(), 5);
}

// ============================================================================
// Trimming
// ============================================================================

#[test]
fn test_free_trims_trailing_unused_slots() {
    let mut alloc = DescriptorAllocator::new(8);
    textures(&mut alloc, 4);
    alloc.free(2).unwrap();
    assert_eq!(alloc.len(), 4);

    alloc.free(3).unwrap();
    assert_eq!(alloc.len(), 2);
    assert_eq!(alloc.first_free(), 2);
}

#[test]
fn test_free_all_resets_length() {
    let mut alloc = DescriptorAllocator::new(16);
    let indices = textures(&mut alloc, 10);
    for index in [4, 0, 9, 7, 1, 2, 3, 8, 6, 5] {
        alloc.free(indices[index]).unwrap();
    }
    assert_eq!(alloc.len(), 0);
    assert_eq!(alloc.live_count(), 0);
    assert_eq!(alloc.first_free(), 0);
}

#[test]
fn test_random_sequence_keeps_indices_unique() {
    let mut alloc = DescriptorAllocator::new(64);
    let mut live: Vec<u32> = Vec::new();
    // Deterministic pseudo-random walk
    let mut state = 0x2545_f491u32;
    for step in 0..500 {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        if live.is_empty() || (state % 3 != 0 && live.len() < 64) {
            let index = alloc.allocate(DescriptorKind::Texture2D, &format!("t{}", step)).unwrap();
            assert!(!live.contains(&index));
            let lowest_free = (0..).find(|i| !live.contains(i)).unwrap();
            assert_eq!(index, lowest_free);
            live.push(index);
        } else {
            let victim = live.swap_remove(state as usize % live.len());
            alloc.free(victim).unwrap();
        }
        assert_eq!(alloc.live_count() as usize, live.len());
        assert_eq!(alloc.len(), live.iter().max().map(|max| max + 1).unwrap_or(0));
    }
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_allocation_beyond_capacity_fails() {
    let mut alloc = DescriptorAllocator::new(2);
    textures(&mut alloc, 2);
    let err = alloc.allocate(DescriptorKind::Buffer, "overflow").unwrap_err();
    assert!(matches!(err, Error::DescriptorTableFull { capacity: 2 }));

    alloc.free(0).unwrap();
    assert_eq!(alloc.allocate(DescriptorKind::Buffer, "fits").unwrap(), 0);
}

#[test]
fn test_double_free_is_rejected() {
    let mut alloc = DescriptorAllocator::new(4);
    textures(&mut alloc, 2);
    alloc.free(0).unwrap();
    assert!(matches!(alloc.free(0), Err(Error::InvalidResource(_))));
    assert!(alloc.free(17).is_err());
}

#[test]
fn test_allocate_unused_kind_is_rejected() {
    let mut alloc = DescriptorAllocator::new(4);
    assert!(alloc.allocate(DescriptorKind::Unused, "x").is_err());
    assert!(alloc.is_empty());
}

// ============================================================================
// Inspection
// ============================================================================

#[test]
fn test_next_and_previous_of_kind() {
    let mut alloc = DescriptorAllocator::new(8);
    alloc.allocate(DescriptorKind::Texture2D, "a").unwrap(); // 0
    alloc.allocate(DescriptorKind::Buffer, "b").unwrap(); // 1
    alloc.allocate(DescriptorKind::TextureCube, "c").unwrap(); // 2
    alloc.allocate(DescriptorKind::Texture2D, "d").unwrap(); // 3

    assert_eq!(alloc.next_of_kind(0, DescriptorKind::Texture2D), Some(3));
    assert_eq!(alloc.next_of_kind(3, DescriptorKind::Texture2D), None);
    assert_eq!(alloc.previous_of_kind(3, DescriptorKind::Texture2D), Some(0));
    assert_eq!(alloc.previous_of_kind(0, DescriptorKind::Texture2D), None);
    assert_eq!(alloc.previous_of_kind(100, DescriptorKind::Buffer), Some(1));

    alloc.free(1).unwrap();
    assert_eq!(alloc.next_of_kind(0, DescriptorKind::Unused), Some(1));
}
