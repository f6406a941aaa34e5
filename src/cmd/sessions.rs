// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::cmd::Context;
use crate::cmd::print_json;
use crate::cmd::queue::QueueKind;
use crate::error::Fallible;
use crate::types::session_record::SessionId;
use crate::types::timestamp::Timestamp;

pub fn start_session(
    ctx: &Context,
    kind: QueueKind,
    minutes: Option<u32>,
    now: Timestamp,
) -> Fallible<()> {
    let record = ctx
        .service
        .start_session(&ctx.user, kind.into(), minutes, now)?;
    print_json(&record)
}

pub fn finish_session(ctx: &Context, id: SessionId, now: Timestamp) -> Fallible<()> {
    let record = ctx.service.complete_session(&ctx.user, id, now)?;
    print_json(&record)
}

pub fn print_sessions(ctx: &Context, limit: usize) -> Fallible<()> {
    let sessions = ctx.service.sessions(&ctx.user, limit)?;
    print_json(&sessions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::testing::context;
    use crate::cmd::testing::now;

    #[test]
    fn test_session_commands() -> Fallible<()> {
        let (_dir, ctx) = context();
        start_session(&ctx, QueueKind::Question, Some(10), now())?;
        let open = ctx.service.sessions(&ctx.user, 1)?;
        assert_eq!(open.len(), 1);
        finish_session(&ctx, open[0].id, now().plus_days(1))?;
        assert!(finish_session(&ctx, open[0].id, now().plus_days(1)).is_err());
        assert!(finish_session(&ctx, SessionId::new(99), now()).is_err());
        print_sessions(&ctx, 10)?;
        assert!(ctx.service.sessions(&ctx.user, 10)?[0].is_completed());
        Ok(())
    }
}
