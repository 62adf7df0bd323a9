use numinterp::{
    array::TypedArray,
    element_type::{ElementType, Endianness, NATIVE_ENDIAN},
    interpretation::{Interpretation, InterpretationError, TargetedView, TypedView, View},
};

fn be_bytes_u32(values: &[u32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_be_bytes()).collect()
}

fn ne_bytes_u32(values: &[u32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_ne_bytes()).collect()
}

fn be_bytes_f32(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_be_bytes()).collect()
}

/// Assemble `chunks` of raw bytes covering all of their entries.
fn assemble_typed(
    view: &TypedView,
    chunks: &[&[u8]],
) -> Result<TypedArray, InterpretationError> {
    let num_entries: usize = chunks
        .iter()
        .map(|chunk| view.num_items(chunk.len()))
        .sum();
    let mut destination = view.allocate_destination(num_entries, num_entries)?;
    let mut item_start = 0;
    for chunk in chunks {
        let num_items = view.num_items(chunk.len());
        let group_size: usize = view.source_dims().iter().product();
        let source = view.read_chunk(chunk, None, 0, num_items / group_size)?;
        view.fill(
            &source,
            &mut destination,
            item_start,
            item_start + num_items,
            0,
            num_entries,
        )?;
        item_start += num_items;
    }
    Ok(view.finalize(destination))
}

#[test]
fn scenario_big_endian_u32() -> Result<(), Box<dyn std::error::Error>> {
    let view = TypedView::new(">u4", &[])?;
    let bytes: [u8; 8] = [0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x02];
    let array = assemble_typed(&view, &[&bytes])?;
    assert_eq!(array.element_type(), &ElementType::native::<u32>());
    assert_eq!(array.shape(), &[2]);
    assert_eq!(array.as_bytes(), ne_bytes_u32(&[1u32, 2]));
    assert_eq!(array.to_elements::<u32>()?, vec![1, 2]);
    Ok(())
}

#[test]
fn scenario_float_groups_from_two_chunks() -> Result<(), Box<dyn std::error::Error>> {
    let view = TypedView::new(">f4", &[3])?;
    let first = be_bytes_f32(&[1.5, -2.0, 3.25]);
    let second = be_bytes_f32(&[4.0, 5.5, -6.75]);
    assert_eq!(first.len(), 12);
    let array = assemble_typed(&view, &[&first, &second])?;
    assert_eq!(array.shape(), &[2, 3]);
    assert_eq!(
        array.to_elements::<f32>()?,
        vec![1.5, -2.0, 3.25, 4.0, 5.5, -6.75]
    );
    #[cfg(feature = "ndarray")]
    assert_eq!(
        array.to_ndarray::<f32>()?,
        ndarray::array![[1.5, -2.0, 3.25], [4.0, 5.5, -6.75]].into_dyn()
    );
    Ok(())
}

#[test]
fn round_trip_identity() -> Result<(), Box<dyn std::error::Error>> {
    let values: Vec<i16> = (-12..12).map(|v| v * 1000).collect();
    for tag in ["<i2", ">i2"] {
        for dims in [&[][..], &[4][..], &[2, 3][..]] {
            let bytes: Vec<u8> = if tag.starts_with('<') {
                values.iter().flat_map(|v| v.to_le_bytes()).collect()
            } else {
                values.iter().flat_map(|v| v.to_be_bytes()).collect()
            };
            let view = TypedView::new(tag, dims)?;
            let array = assemble_typed(&view, &[&bytes])?;
            assert!(array.element_type().is_native());
            assert_eq!(array.dims(), dims);
            assert_eq!(array.num_elements(), values.len());
            assert_eq!(array.to_elements::<i16>()?, values);
        }
    }
    Ok(())
}

#[test]
fn byte_order_conversion() -> Result<(), Box<dyn std::error::Error>> {
    let values = [0u32, 1, 0x0102_0304, 0xdead_beef, u32::MAX];
    let view = TypedView::new_with_destination(">i4", Some("<i4".into()), &[], None)?;
    let array = assemble_typed(&view, &[&be_bytes_u32(&values)])?;
    assert_eq!(
        array.as_bytes(),
        values
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect::<Vec<u8>>()
    );
    for (element, value) in array.as_bytes().chunks_exact(4).zip(values) {
        let mut swapped = value.to_be_bytes();
        swapped.reverse();
        assert_eq!(element, swapped);
    }
    Ok(())
}

#[test]
fn shape_product_invariants() -> Result<(), Box<dyn std::error::Error>> {
    let view = TypedView::new("u1", &[3, 4])?;
    for num_items in 0..100 {
        match view.allocate_destination(num_items, 0) {
            Ok(destination) => {
                assert_eq!(num_items % 12, 0);
                assert_eq!(destination.shape(), &[num_items / 12, 3, 4]);
            }
            Err(InterpretationError::ReshapeMismatch { product, .. }) => {
                assert_ne!(num_items % 12, 0);
                assert_eq!(product, 12);
            }
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}

#[test]
fn capacity_enforcement() -> Result<(), Box<dyn std::error::Error>> {
    const K: usize = 5;
    let mut buffer = TypedArray::new(ElementType::native::<f32>(), K, &[2])?;
    let view = TargetedView::new(">f4", &mut buffer, &[])?;
    for groups in 0..=2 * K {
        let result = view.allocate_destination(groups * 2, groups);
        if groups <= K {
            let destination = result?;
            assert_eq!(destination.stop(), groups);
        } else {
            assert!(matches!(
                result,
                Err(InterpretationError::CapacityExceeded { capacity: 10, .. })
            ));
        }
    }
    Ok(())
}

#[test]
fn incremental_fill_equals_one_shot_fill() -> Result<(), Box<dyn std::error::Error>> {
    let values: Vec<u32> = (0..24).map(|v| v * 7 + 3).collect();
    let bytes = be_bytes_u32(&values);
    let view = TypedView::new_with_destination(">u4", Some("f8".into()), &[2], None)?;

    let one_shot = assemble_typed(&view, &[&bytes])?;
    for splits in [&[4][..], &[8, 16][..], &[4, 8, 12, 20][..]] {
        let mut chunks = Vec::new();
        let mut start = 0;
        for &stop in splits.iter().chain(std::iter::once(&values.len())) {
            chunks.push(&bytes[start * 4..stop * 4]);
            start = stop;
        }
        let incremental = assemble_typed(&view, &chunks)?;
        assert_eq!(incremental, one_shot);
    }
    Ok(())
}

#[test]
fn clip_correctness() -> Result<(), Box<dyn std::error::Error>> {
    let values: Vec<u32> = (0..12).collect();
    let bytes = be_bytes_u32(&values);
    let view = TypedView::new(">u4", &[2])?;
    let num_groups = 6;
    for a in 0..=num_groups {
        for b in a..=num_groups {
            let mut destination = view.allocate_destination(12, num_groups)?;
            let source = view.read_chunk(&bytes, None, 0, num_groups)?;
            view.fill(&source, &mut destination, 0, 12, 0, num_groups)?;
            let full = view.finalize(destination.clone());
            let clipped = view.finalize(view.clip_destination(destination, a, b)?);
            assert_eq!(clipped.shape(), &[b - a, 2]);
            assert_eq!(clipped.view(), full.view().slice_groups(a, b)?);
        }
    }
    Ok(())
}

#[test]
fn targeted_view_clip_and_trim() -> Result<(), Box<dyn std::error::Error>> {
    let bytes = be_bytes_u32(&[10, 20, 30, 40]);
    let mut buffer = TypedArray::new(ElementType::native::<u64>(), 10, &[])?;
    {
        let view = TargetedView::new(">u4", &mut buffer, &[])?;
        let mut destination = view.allocate_destination(4, 4)?;
        let source = view.read_chunk(&bytes, None, 0, 4)?;
        view.fill(&source, &mut destination, 0, 4, 0, 4)?;
        let output = view.finalize(view.clip_destination(destination, 1, 10)?);
        assert_eq!(output.shape(), vec![4]);
        assert_eq!(output.to_elements::<u64>()?, vec![20, 30, 40, 0]);
    }
    assert_eq!(buffer.to_elements::<u64>()?[..5], [10, 20, 30, 40, 0]);
    Ok(())
}

#[test]
fn stacked_views() -> Result<(), Box<dyn std::error::Error>> {
    let bytes = be_bytes_u32(&[1, 2, 3, 4, 5, 6]);
    let inner = TypedView::new(">u4", &[3])?;
    let inner_output = assemble_typed(&inner, &[&bytes])?;

    let outer = TypedView::new_with_destination(
        *inner_output.element_type(),
        Some("<i8".into()),
        &[3],
        Some(&[6]),
    )?;
    let source = inner_output.view();
    let num_items = outer.source_num_items(&source);
    assert_eq!(num_items, 6);
    let mut destination = outer.allocate_destination(num_items, 2)?;
    outer.fill(&source, &mut destination, 0, num_items, 0, 2)?;
    let array = outer.finalize(destination);
    assert_eq!(array.shape(), &[1, 6]);
    assert_eq!(array.to_elements::<i64>()?, vec![1, 2, 3, 4, 5, 6]);
    Ok(())
}

#[test]
fn compatible_views() -> Result<(), Box<dyn std::error::Error>> {
    let a = TypedView::new(">f4", &[3])?;
    let b = TypedView::new("<f4", &[3])?;
    let c = a.retype(Some("f8".into()), None)?;
    let d = a.retype(None, Some(&[1, 3]))?;
    assert!(a.compatible(&b));
    assert!(!a.compatible(&c));
    assert!(!a.compatible(&d));

    let mut buffer = TypedArray::new(ElementType::native::<f32>(), 4, &[3])?;
    let targeted = TargetedView::new(">f4", &mut buffer, &[3])?;
    assert!(a.compatible(&targeted));
    assert!(targeted.compatible(&b));
    Ok(())
}

#[test]
fn view_enum_dispatch() -> Result<(), Box<dyn std::error::Error>> {
    let bytes = be_bytes_u32(&[7, 8, 9]);
    let mut buffer = TypedArray::new(ElementType::native::<u32>(), 3, &[])?;
    let views: [View; 2] = [
        TypedView::new(">u4", &[])?.into(),
        TargetedView::new(">u4", &mut buffer, &[])?.into(),
    ];
    for view in &views {
        let mut destination = view.allocate_destination(3, 3)?;
        let source = view.read_chunk(&bytes, None, 1, 3)?;
        view.fill(&source, &mut destination, 0, 2, 0, 3)?;
        let output = view.finalize(view.clip_destination(destination, 0, 2)?);
        assert_eq!(output.to_elements::<u32>()?, vec![8, 9]);
    }
    Ok(())
}

#[test]
fn native_destination_default() -> Result<(), Box<dyn std::error::Error>> {
    let view = TypedView::new("i8", &[])?;
    assert_eq!(
        view.source_element_type().endianness(),
        Some(Endianness::Big)
    );
    assert_eq!(view.dest_element_type().endianness(), Some(NATIVE_ENDIAN));
    Ok(())
}
