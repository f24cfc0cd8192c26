//! Batch application of an operator to a collection of images

use std::collections::HashMap;

use parking_lot::Mutex;
use rayon::prelude::*;
use tracing::debug;

use super::parallel::Exec;
use super::{Engine, ExecutionMode, Operator, Strategy, check_fit};
use crate::error::Result;
use crate::models::{BinaryImage, StructuringElement};

/// Which level of a batch runs in parallel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchSchedule {
    /// One image at a time, pixel loop parallel
    #[default]
    Pixels,
    /// Whole images in parallel, pixel loop sequential
    Images,
    /// Images and pixel loops in parallel on the same pool
    Nested,
}

impl Engine {
    /// Apply `operator` to every image of a batch.
    ///
    /// Results are keyed by each image's source name; duplicate names
    /// overwrite each other. The schedule is ignored in sequential mode.
    /// Any failure fails the whole batch.
    pub fn apply_to_batch(
        &self,
        images: &[BinaryImage],
        se: &StructuringElement,
        operator: Operator,
        strategy: Strategy,
        mode: ExecutionMode,
        schedule: BatchSchedule,
    ) -> Result<HashMap<String, BinaryImage>> {
        for image in images {
            check_fit(image, se)?;
        }

        debug!(
            "Batch of {} images: {} / {} / {:?} / {:?}",
            images.len(),
            operator,
            strategy,
            mode,
            schedule
        );

        let threads = match mode {
            ExecutionMode::Sequential => {
                return self.batch_in_order(images, se, operator, strategy, Exec::Sequential);
            }
            ExecutionMode::Parallel { threads } => threads,
        };

        let pool = self.pools.get(threads)?;
        match schedule {
            BatchSchedule::Pixels => pool
                .install(|| self.batch_in_order(images, se, operator, strategy, Exec::Parallel)),
            BatchSchedule::Images | BatchSchedule::Nested => {
                let exec = if schedule == BatchSchedule::Nested {
                    Exec::Parallel
                } else {
                    Exec::Sequential
                };
                let results = Mutex::new(HashMap::with_capacity(images.len()));
                pool.install(|| {
                    images.par_iter().try_for_each(|image| -> Result<()> {
                        let output = self.apply_with(operator, image, se, strategy, exec)?;
                        results.lock().insert(image.source().to_string(), output);
                        Ok(())
                    })
                })?;
                Ok(results.into_inner())
            }
        }
    }

    fn batch_in_order(
        &self,
        images: &[BinaryImage],
        se: &StructuringElement,
        operator: Operator,
        strategy: Strategy,
        exec: Exec,
    ) -> Result<HashMap<String, BinaryImage>> {
        let mut results = HashMap::with_capacity(images.len());
        for image in images {
            let output = self.apply_with(operator, image, se, strategy, exec)?;
            results.insert(image.source().to_string(), output);
        }
        Ok(results)
    }
}
