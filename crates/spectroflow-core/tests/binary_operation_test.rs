//! End-to-end tests of the binary operation dispatcher.

use std::collections::BTreeSet;

use spectroflow_core::{
    AddKernel, BinaryOperation, Communicator, DenseChannel, Event, EventChannel, MismatchPolicy,
    MultiplyKernel, Representation, SpectroError, StorageMode, SubtractKernel, Workspace,
    WorkspaceData,
};

fn channels(values: &[f64], samples: usize) -> Vec<DenseChannel<f64>> {
    values
        .iter()
        .map(|&v| DenseChannel::new(vec![v; samples], vec![0.0; samples]).unwrap())
        .collect()
}

#[test]
fn test_dense_plus_dense_elementwise() {
    let comm = Communicator::single();
    let lhs = Workspace::dense(3, 5, 2.0, 0.0);
    let rhs = Workspace::dense(3, 5, 3.0, 0.0);
    let out = BinaryOperation::new(AddKernel)
        .execute(&comm, &lhs, &rhs)
        .unwrap();
    assert_eq!(out.representation(), Representation::Dense);
    for i in 0..3 {
        assert!(out.dense_channel(i).unwrap().y.iter().all(|&v| v == 5.0));
    }
}

#[test]
fn test_dense_times_scalar_broadcast() {
    let comm = Communicator::single();
    let lhs = Workspace::dense(4, 6, 3.0, 0.0);
    let rhs = Workspace::single_value(2.0, 0.0);
    let out = BinaryOperation::new(MultiplyKernel)
        .execute(&comm, &lhs, &rhs)
        .unwrap();
    assert_eq!(out.channel_count(), 4);
    assert!(out.dense_channel(2).unwrap().y.iter().all(|&v| v == 6.0));
}

#[test]
fn test_scalar_against_scalar_stays_scalar() {
    let comm = Communicator::single();
    let lhs = Workspace::single_value(6.0, 0.0);
    let rhs = Workspace::single_value(2.0, 0.0);
    let out = BinaryOperation::new(SubtractKernel)
        .execute(&comm, &lhs, &rhs)
        .unwrap();
    assert_eq!(out.representation(), Representation::Scalar);
    assert_eq!(out.scalar_value(), Some((4.0, 0.0)));
}

#[test]
fn test_single_channel_rhs_broadcasts_across_channels() {
    let comm = Communicator::single();
    let lhs = Workspace::dense_from_channels(channels(&[1.0, 2.0, 3.0], 4)).unwrap();
    let rhs = Workspace::dense_from_channels(channels(&[10.0], 4)).unwrap();
    let out = BinaryOperation::new(AddKernel)
        .execute(&comm, &lhs, &rhs)
        .unwrap();
    for (i, expected) in [11.0, 12.0, 13.0].iter().enumerate() {
        assert!(out
            .dense_channel(i)
            .unwrap()
            .y
            .iter()
            .all(|v| v == expected));
    }
}

#[test]
fn test_size_mismatch_is_rejected() {
    let comm = Communicator::single();
    let lhs = Workspace::<f64>::dense(3, 5, 1.0, 0.0);
    let rhs = Workspace::<f64>::dense(3, 6, 1.0, 0.0);
    let out = BinaryOperation::new(AddKernel).execute(&comm, &lhs, &rhs);
    assert!(matches!(out, Err(SpectroError::SizeIncompatible { .. })));

    let rhs = Workspace::<f64>::dense(4, 5, 1.0, 0.0);
    let out = BinaryOperation::new(AddKernel).execute(&comm, &lhs, &rhs);
    assert!(matches!(out, Err(SpectroError::SizeIncompatible { .. })));
}

#[test]
fn test_grouped_correspondence_applies_per_group() {
    let comm = Communicator::single();
    let lhs = Workspace::dense_from_channels(channels(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 4))
        .unwrap()
        .with_element_groups(vec![vec![0], vec![1], vec![2], vec![3], vec![4], vec![5]])
        .unwrap();
    let rhs = Workspace::dense_from_channels(channels(&[10.0, 20.0], 4))
        .unwrap()
        .with_element_groups(vec![vec![0, 1, 2], vec![3, 4, 5]])
        .unwrap();
    let out = BinaryOperation::new(AddKernel)
        .allow_different_channel_count(true)
        .execute(&comm, &lhs, &rhs)
        .unwrap();
    let expected = [11.0, 12.0, 13.0, 24.0, 25.0, 26.0];
    for (i, expected) in expected.iter().enumerate() {
        assert!(out
            .dense_channel(i)
            .unwrap()
            .y
            .iter()
            .all(|v| v == expected));
    }
    // The output keeps the LHS grouping.
    assert_eq!(out.element_id_sets(), lhs.element_id_sets());
}

#[test]
fn test_unmatched_channels_follow_the_mismatch_policy() {
    let comm = Communicator::single();
    let lhs = Workspace::dense_from_channels(channels(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2))
        .unwrap()
        .with_element_groups(vec![vec![3], vec![4], vec![5], vec![6], vec![7], vec![8]])
        .unwrap();
    let rhs = Workspace::dense_from_channels(channels(&[10.0, 20.0], 2))
        .unwrap()
        .with_element_groups(vec![vec![0, 1, 2], vec![3, 4, 5]])
        .unwrap();

    let zeroed = BinaryOperation::new(AddKernel)
        .allow_different_channel_count(true)
        .execute(&comm, &lhs, &rhs)
        .unwrap();
    let expected = [21.0, 22.0, 23.0, 0.0, 0.0, 0.0];
    for (i, expected) in expected.iter().enumerate() {
        assert!(zeroed
            .dense_channel(i)
            .unwrap()
            .y
            .iter()
            .all(|v| v == expected));
    }

    let skipped = BinaryOperation::new(AddKernel)
        .allow_different_channel_count(true)
        .mismatch_policy(MismatchPolicy::Skip)
        .execute(&comm, &lhs, &rhs)
        .unwrap();
    let expected = [21.0, 22.0, 23.0, 4.0, 5.0, 6.0];
    for (i, expected) in expected.iter().enumerate() {
        assert!(skipped
            .dense_channel(i)
            .unwrap()
            .y
            .iter()
            .all(|v| v == expected));
    }
}

#[test]
fn test_fully_disjoint_groupings_are_fatal() {
    let comm = Communicator::single();
    let lhs = Workspace::<f64>::dense(2, 3, 1.0, 0.0)
        .with_element_groups(vec![vec![100], vec![101]])
        .unwrap();
    let rhs = Workspace::<f64>::dense(3, 3, 1.0, 0.0)
        .with_element_groups(vec![vec![0], vec![1], vec![2]])
        .unwrap();
    let out = BinaryOperation::new(AddKernel)
        .allow_different_channel_count(true)
        .execute(&comm, &lhs, &rhs);
    assert!(matches!(out, Err(SpectroError::GroupingDisjoint { .. })));
}

#[test]
fn test_event_times_scalar_keeps_events() {
    let comm = Communicator::single();
    let lhs = Workspace::grouped_events(vec![vec![0], vec![1]], 4);
    let rhs = Workspace::single_value(2.0, 0.0);
    let out = BinaryOperation::new(MultiplyKernel)
        .execute(&comm, &lhs, &rhs)
        .unwrap();
    assert_eq!(out.representation(), Representation::SparseEvents);
    let dense = out.dense_channel(0).unwrap();
    assert!(dense.y.iter().all(|&v| v == 2.0));
}

#[test]
fn test_event_plus_event_concatenates() {
    let comm = Communicator::single();
    let lhs = Workspace::<f64>::grouped_events(vec![vec![0], vec![1]], 4);
    let rhs = Workspace::<f64>::grouped_events(vec![vec![0], vec![1]], 4);
    let out = BinaryOperation::new(AddKernel)
        .execute(&comm, &lhs, &rhs)
        .unwrap();
    assert_eq!(out.representation(), Representation::SparseEvents);
    assert!(out.dense_channel(1).unwrap().y.iter().all(|&v| v == 2.0));
}

#[test]
fn test_event_plus_single_bin_event_rhs_concatenates() {
    // A 1-channel, 1-bin event RHS is a single value, but its events must
    // broadcast by concatenation, not through the scalar path.
    let comm = Communicator::single();
    let lhs = Workspace::<f64>::grouped_events(vec![vec![0], vec![1]], 4);
    let rhs = Workspace::new(
        WorkspaceData::Events(vec![EventChannel::with_events(
            vec![0.0, 1.0],
            vec![Event::counts(0.5)],
        )]),
        vec![BTreeSet::new()],
        StorageMode::Cloned,
    )
    .unwrap();
    assert!(rhs.is_single_value());

    let out = BinaryOperation::new(AddKernel)
        .execute(&comm, &lhs, &rhs)
        .unwrap();
    assert_eq!(out.representation(), Representation::SparseEvents);
    for i in 0..2 {
        let dense = out.dense_channel(i).unwrap();
        assert_eq!(dense.y, vec![2.0, 1.0, 1.0, 1.0]);
    }
}

#[test]
fn test_event_plus_dense_falls_back_to_dense_output() {
    let comm = Communicator::single();
    let lhs = Workspace::grouped_events(vec![vec![0], vec![1]], 4);
    let rhs = Workspace::dense(2, 4, 1.0, 0.0);
    let out = BinaryOperation::new(AddKernel)
        .execute(&comm, &lhs, &rhs)
        .unwrap();
    assert_eq!(out.representation(), Representation::Dense);
    assert!(out.dense_channel(0).unwrap().y.iter().all(|&v| v == 2.0));
}

#[test]
fn test_output_representation_is_not_reused_between_calls() {
    // An event invocation followed by a dense one reusing the same output
    // workspace must not leave it event-typed.
    let comm = Communicator::single();
    let op = BinaryOperation::new(MultiplyKernel);
    let scalar = Workspace::single_value(2.0, 0.0);
    let mut out = Workspace::single_value(0.0, 0.0);

    let event_lhs = Workspace::grouped_events(vec![vec![0], vec![1]], 4);
    op.execute_into(&comm, &event_lhs, &scalar, &mut out).unwrap();
    assert_eq!(out.representation(), Representation::SparseEvents);

    let dense_lhs = Workspace::dense(2, 4, 3.0, 0.0);
    op.execute_into(&comm, &dense_lhs, &scalar, &mut out).unwrap();
    assert_eq!(out.representation(), Representation::Dense);
    assert!(out.dense_channel(0).unwrap().y.iter().all(|&v| v == 6.0));
}

#[test]
fn test_failed_invocation_leaves_the_output_untouched() {
    let comm = Communicator::single();
    let lhs = Workspace::<f64>::dense(3, 5, 1.0, 0.0);
    let rhs = Workspace::<f64>::dense(3, 7, 1.0, 0.0);
    let mut out = Workspace::single_value(42.0, 0.0);
    let result = BinaryOperation::new(AddKernel).execute_into(&comm, &lhs, &rhs, &mut out);
    assert!(result.is_err());
    assert_eq!(out.scalar_value(), Some((42.0, 0.0)));
}

#[test]
fn test_in_place_accumulation() {
    let comm = Communicator::single();
    let mut lhs = Workspace::dense(2, 3, 1.0, 0.0);
    let rhs = Workspace::dense(2, 3, 2.0, 0.0);
    let op = BinaryOperation::new(AddKernel);
    op.execute_in_place(&comm, &mut lhs, &rhs).unwrap();
    op.execute_in_place(&comm, &mut lhs, &rhs).unwrap();
    assert!(lhs.dense_channel(0).unwrap().y.iter().all(|&v| v == 5.0));
}

#[test]
fn test_storage_mode_mismatch_fails_only_in_parallel() {
    let lhs = Workspace::<f64>::dense(4, 2, 1.0, 0.0).with_storage_mode(StorageMode::Cloned);
    let rhs = Workspace::<f64>::dense(4, 2, 1.0, 0.0).with_storage_mode(StorageMode::Distributed);
    let op = BinaryOperation::new(AddKernel);

    let err = op
        .execute(&Communicator::new(0, 2), &lhs, &rhs)
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Algorithm does not support execution with input workspaces of the \
         following storage types: \nLHSWorkspace Cloned\nRHSWorkspace Distributed\n."
    );

    let out = op.execute(&Communicator::single(), &lhs, &rhs).unwrap();
    assert_eq!(out.storage_mode(), StorageMode::Cloned);
}

#[test]
fn test_cloned_scalar_rhs_is_mode_agnostic_in_parallel() {
    let lhs = Workspace::<f64>::dense(4, 2, 3.0, 0.0).with_storage_mode(StorageMode::Distributed);
    let rhs = Workspace::single_value(2.0, 0.0).with_storage_mode(StorageMode::Cloned);
    let out = BinaryOperation::new(MultiplyKernel)
        .execute(&Communicator::new(1, 2), &lhs, &rhs)
        .unwrap();
    assert_eq!(out.storage_mode(), StorageMode::Distributed);
    assert!(out.dense_channel(0).unwrap().y.iter().all(|&v| v == 6.0));
}

#[test]
fn test_channel_relaxation_is_rejected_in_parallel() {
    let lhs = Workspace::<f64>::dense(4, 2, 1.0, 0.0).with_storage_mode(StorageMode::Cloned);
    let rhs = Workspace::<f64>::dense(4, 2, 1.0, 0.0).with_storage_mode(StorageMode::Cloned);
    let op = BinaryOperation::new(AddKernel).allow_different_channel_count(true);

    assert!(op.execute(&Communicator::new(0, 2), &lhs, &rhs).is_err());
    assert!(op.execute(&Communicator::single(), &lhs, &rhs).is_ok());
}
