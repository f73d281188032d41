//! Capability invocation pipeline
//!
//! Send, NBSend and Call share one path: resolve the invoked capability,
//! resolve any extra capabilities the message declares, hand the decoded
//! request to the object layer, then settle the thread according to the
//! outcome. Lookup failures are faults (blocking forms only); decode
//! refusals are errors, replied to call forms and dropped otherwise.

use k9_cap::{CPtr, Fault, ThreadState};
use k9_syscall::{MessageInfo, SyscallError, MSG_REGISTERS};

use crate::context::ExecContext;
use crate::fault;
use crate::services::{ExtraCaps, InvocationOutcome, KernelServices};

/// Run one capability invocation for the current thread.
///
/// The returned outcome is already fully settled: `Failed` has been
/// replied (call forms) or dropped, `Completed` has restored the thread
/// to `Running` where the operation left it restartable. Only
/// `Preempted` demands anything further from the caller.
pub fn handle_invocation<S: KernelServices>(
    ctx: &mut ExecContext<'_>,
    services: &mut S,
    is_call: bool,
    is_blocking: bool,
) -> InvocationOutcome {
    let cptr = CPtr::from_raw(ctx.regs.cap_reg());
    let mut info = MessageInfo::from_word(ctx.regs.msg_info_reg());

    let dest = match services.lookup_cap(ctx.current, cptr) {
        Ok(loc) => loc,
        Err(lookup) => {
            log::debug!("invoked cap {} unresolvable: {}", cptr, lookup.name());
            if is_blocking {
                fault::route_fault(
                    ctx,
                    services,
                    Fault::CapFault {
                        cptr,
                        in_receive_phase: false,
                        lookup,
                    },
                );
            }
            return InvocationOutcome::Completed;
        }
    };

    let extras = if info.extra_caps() > 0 {
        match services.lookup_extra_caps(ctx, info.extra_caps() as usize) {
            Ok(extras) => extras,
            Err((failed, lookup)) => {
                log::debug!("extra cap {} unresolvable: {}", failed, lookup.name());
                if is_blocking {
                    fault::route_fault(
                        ctx,
                        services,
                        Fault::CapFault {
                            cptr: failed,
                            in_receive_phase: false,
                            lookup,
                        },
                    );
                }
                return InvocationOutcome::Completed;
            }
        }
    } else {
        ExtraCaps::EMPTY
    };

    if info.length() as usize > MSG_REGISTERS && !ctx.has_ipc_buffer() {
        // Only the register part of the message exists without a
        // mapped IPC buffer.
        info = info.with_length(MSG_REGISTERS as u64);
    }

    let outcome = services.decode_invoke(
        ctx,
        dest,
        &extras,
        info.label(),
        info.length() as usize,
        is_call,
        is_blocking,
    );
    match outcome {
        InvocationOutcome::Failed(err) => {
            if is_call {
                write_error_reply(ctx, &err);
            } else {
                log::debug!(
                    "dropping {} for non-call invocation by {}",
                    err.name(),
                    ctx.thread.name_str()
                );
            }
        }
        InvocationOutcome::Completed => {
            if ctx.thread.state == ThreadState::Restart {
                if is_call {
                    write_success_reply(ctx);
                }
                ctx.thread.state = ThreadState::Running;
            }
        }
        InvocationOutcome::Preempted => {}
    }
    outcome
}

/// Write an error reply into the caller's registers.
///
/// Label carries the error code, message registers the detail words.
/// No badge accompanies a kernel reply.
pub(crate) fn write_error_reply(ctx: &mut ExecContext<'_>, err: &SyscallError) {
    let (words, count) = err.detail_words();
    ctx.regs.set_cap_reg(0);
    for (i, word) in words.iter().take(count as usize).enumerate() {
        ctx.regs.set_msg_reg(i, *word);
    }
    let info = MessageInfo::new(err.code() as u64, count, 0, 0);
    ctx.regs.set_msg_info_reg(info.to_word());
}

/// Write the empty success reply into the caller's registers.
pub(crate) fn write_success_reply(ctx: &mut ExecContext<'_>) {
    ctx.regs.set_cap_reg(0);
    ctx.regs
        .set_msg_info_reg(MessageInfo::new(0, 0, 0, 0).to_word());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{endpoint_cap, ExecFixture, MockKernel};
    use k9_cap::{CapRights, LookupFault};
    use k9_syscall::ErrorCode;

    #[test]
    fn test_call_completion_writes_empty_reply() {
        let mut fx = ExecFixture::new();
        fx.regs.set_cap_reg(0x40);
        fx.regs
            .set_msg_info_reg(MessageInfo::new(11, 2, 0, 0).to_word());
        let mut mock = MockKernel::new();
        mock.lookup_result = Ok(endpoint_cap(CapRights::RW));

        let mut ctx = fx.ctx();
        let outcome = handle_invocation(&mut ctx, &mut mock, true, true);

        assert_eq!(outcome, InvocationOutcome::Completed);
        assert_eq!(ctx.thread.state, ThreadState::Running);
        assert_eq!(ctx.regs.cap_reg(), 0);
        let reply = MessageInfo::from_word(ctx.regs.msg_info_reg());
        assert_eq!(reply.label(), 0);
        assert_eq!(reply.length(), 0);
        // No extra caps declared, so no extra lookup happened.
        assert_eq!(mock.lookups, 1);
        assert_eq!(mock.extra_lookups, 0);
        let record = mock.last_invoke.expect("invocation reached decode");
        assert_eq!(record.label, 11);
        assert_eq!(record.length, 2);
        assert!(record.is_call);
        assert!(record.is_blocking);
    }

    #[test]
    fn test_call_lookup_failure_faults_without_reply() {
        let mut fx = ExecFixture::new();
        fx.regs.set_cap_reg(0x99);
        let request = MessageInfo::new(11, 0, 0, 0).to_word();
        fx.regs.set_msg_info_reg(request);
        let mut mock = MockKernel::new();
        mock.lookup_result = Err(LookupFault::MissingCapability { bits_left: 12 });

        let mut ctx = fx.ctx();
        let outcome = handle_invocation(&mut ctx, &mut mock, true, true);

        assert_eq!(outcome, InvocationOutcome::Completed);
        assert_eq!(
            mock.delivered,
            Some(Fault::CapFault {
                cptr: CPtr::from_raw(0x99),
                in_receive_phase: false,
                lookup: LookupFault::MissingCapability { bits_left: 12 },
            })
        );
        assert_eq!(mock.invokes, 0);
        // A fault, not an error: the reply registers stay untouched.
        assert_eq!(ctx.regs.msg_info_reg(), request);
        assert_eq!(ctx.regs.cap_reg(), 0x99);
    }

    #[test]
    fn test_blocking_send_lookup_failure_faults() {
        let mut fx = ExecFixture::new();
        fx.regs.set_cap_reg(0x99);
        let mut mock = MockKernel::new();
        mock.lookup_result = Err(LookupFault::MissingCapability { bits_left: 12 });

        let mut ctx = fx.ctx();
        let outcome = handle_invocation(&mut ctx, &mut mock, false, true);

        assert_eq!(outcome, InvocationOutcome::Completed);
        assert_eq!(mock.deliveries, 1);
        assert_eq!(mock.invokes, 0);
    }

    #[test]
    fn test_nonblocking_lookup_failure_is_silent() {
        let mut fx = ExecFixture::new();
        let mut mock = MockKernel::new();
        mock.lookup_result = Err(LookupFault::InvalidRoot);

        let mut ctx = fx.ctx();
        let outcome = handle_invocation(&mut ctx, &mut mock, false, false);

        assert_eq!(outcome, InvocationOutcome::Completed);
        assert_eq!(mock.deliveries, 0);
        assert_eq!(mock.invokes, 0);
    }

    #[test]
    fn test_call_error_reply_encoding() {
        let mut fx = ExecFixture::new();
        let mut mock = MockKernel::new();
        mock.lookup_result = Ok(endpoint_cap(CapRights::RW));
        mock.invoke_outcome = InvocationOutcome::Failed(SyscallError::RangeError { min: 2, max: 9 });

        let mut ctx = fx.ctx();
        let outcome = handle_invocation(&mut ctx, &mut mock, true, true);

        assert_eq!(
            outcome,
            InvocationOutcome::Failed(SyscallError::RangeError { min: 2, max: 9 })
        );
        assert_eq!(ctx.regs.cap_reg(), 0);
        let reply = MessageInfo::from_word(ctx.regs.msg_info_reg());
        assert_eq!(reply.label(), ErrorCode::RangeError as u64);
        assert_eq!(reply.length(), 2);
        assert_eq!(ctx.regs.msg_reg(0), 2);
        assert_eq!(ctx.regs.msg_reg(1), 9);
    }

    #[test]
    fn test_send_error_dropped() {
        let mut fx = ExecFixture::new();
        let request = MessageInfo::new(11, 0, 0, 0).to_word();
        fx.regs.set_msg_info_reg(request);
        let mut mock = MockKernel::new();
        mock.lookup_result = Ok(endpoint_cap(CapRights::RW));
        mock.invoke_outcome = InvocationOutcome::Failed(SyscallError::TruncatedMessage);

        let mut ctx = fx.ctx();
        let outcome = handle_invocation(&mut ctx, &mut mock, false, true);

        assert_eq!(
            outcome,
            InvocationOutcome::Failed(SyscallError::TruncatedMessage)
        );
        assert_eq!(ctx.regs.msg_info_reg(), request);
        assert_eq!(ctx.thread.state, ThreadState::Running);
    }

    #[test]
    fn test_send_completion_skips_reply() {
        let mut fx = ExecFixture::new();
        let request = MessageInfo::new(11, 0, 0, 0).to_word();
        fx.regs.set_msg_info_reg(request);
        let mut mock = MockKernel::new();
        mock.lookup_result = Ok(endpoint_cap(CapRights::RW));

        let mut ctx = fx.ctx();
        let outcome = handle_invocation(&mut ctx, &mut mock, false, true);

        assert_eq!(outcome, InvocationOutcome::Completed);
        assert_eq!(ctx.thread.state, ThreadState::Running);
        assert_eq!(ctx.regs.msg_info_reg(), request);
    }

    #[test]
    fn test_blocked_invocation_keeps_state() {
        let mut fx = ExecFixture::new();
        let request = MessageInfo::new(11, 0, 0, 0).to_word();
        fx.regs.set_msg_info_reg(request);
        let mut mock = MockKernel::new();
        mock.lookup_result = Ok(endpoint_cap(CapRights::RW));
        mock.invoke_blocks = true;

        let mut ctx = fx.ctx();
        let outcome = handle_invocation(&mut ctx, &mut mock, true, true);

        assert_eq!(outcome, InvocationOutcome::Completed);
        assert_eq!(ctx.thread.state, ThreadState::BlockedOnSend);
        // Blocked threads get their reply from the receiver, not here.
        assert_eq!(ctx.regs.msg_info_reg(), request);
    }

    #[test]
    fn test_length_clamped_without_buffer() {
        let mut fx = ExecFixture::new();
        fx.regs
            .set_msg_info_reg(MessageInfo::new(11, 9, 0, 0).to_word());
        let mut mock = MockKernel::new();
        mock.lookup_result = Ok(endpoint_cap(CapRights::RW));

        let mut ctx = fx.ctx();
        let _ = handle_invocation(&mut ctx, &mut mock, false, true);
        let record = mock.last_invoke.expect("decoded");
        assert_eq!(record.length, MSG_REGISTERS);
        // The clamp rewrites only the length field.
        assert_eq!(record.label, 11);
    }

    #[test]
    fn test_full_length_with_buffer() {
        let mut fx = ExecFixture::new();
        fx.with_buffer = true;
        fx.regs
            .set_msg_info_reg(MessageInfo::new(11, 9, 0, 0).to_word());
        let mut mock = MockKernel::new();
        mock.lookup_result = Ok(endpoint_cap(CapRights::RW));

        let mut ctx = fx.ctx();
        let _ = handle_invocation(&mut ctx, &mut mock, false, true);
        assert_eq!(mock.last_invoke.expect("decoded").length, 9);
    }

    #[test]
    fn test_extras_failure_faults_against_failing_extra() {
        let mut fx = ExecFixture::new();
        fx.regs.set_cap_reg(0x40);
        fx.regs
            .set_msg_info_reg(MessageInfo::new(11, 0, 2, 0).to_word());
        let mut mock = MockKernel::new();
        mock.lookup_result = Ok(endpoint_cap(CapRights::RW));
        mock.extras_result = Err((
            CPtr::from_raw(0x77),
            LookupFault::GuardMismatch {
                bits_left: 8,
                guard: 3,
                guard_size: 4,
            },
        ));

        let mut ctx = fx.ctx();
        let outcome = handle_invocation(&mut ctx, &mut mock, false, true);

        assert_eq!(outcome, InvocationOutcome::Completed);
        assert_eq!(mock.extra_lookups, 1);
        assert_eq!(mock.invokes, 0);
        // The fault names the extra that failed, not the invoked cap.
        assert_eq!(
            mock.delivered,
            Some(Fault::CapFault {
                cptr: CPtr::from_raw(0x77),
                in_receive_phase: false,
                lookup: LookupFault::GuardMismatch {
                    bits_left: 8,
                    guard: 3,
                    guard_size: 4,
                },
            })
        );
    }

    #[test]
    fn test_extras_forwarded_to_decode() {
        let mut fx = ExecFixture::new();
        fx.regs
            .set_msg_info_reg(MessageInfo::new(11, 0, 2, 0).to_word());
        let mut mock = MockKernel::new();
        mock.lookup_result = Ok(endpoint_cap(CapRights::RW));
        let mut extras = ExtraCaps::EMPTY;
        assert!(extras.push(endpoint_cap(CapRights::READ)));
        assert!(extras.push(endpoint_cap(CapRights::WRITE)));
        mock.extras_result = Ok(extras);

        let mut ctx = fx.ctx();
        let _ = handle_invocation(&mut ctx, &mut mock, false, true);

        assert_eq!(mock.extra_lookups, 1);
        assert_eq!(mock.last_invoke.expect("decoded").extras_len, 2);
    }

    #[test]
    fn test_preempted_propagates_untouched() {
        let mut fx = ExecFixture::new();
        let request = MessageInfo::new(11, 0, 0, 0).to_word();
        fx.regs.set_msg_info_reg(request);
        let mut mock = MockKernel::new();
        mock.lookup_result = Ok(endpoint_cap(CapRights::RW));
        mock.invoke_outcome = InvocationOutcome::Preempted;

        let mut ctx = fx.ctx();
        let outcome = handle_invocation(&mut ctx, &mut mock, true, true);

        assert_eq!(outcome, InvocationOutcome::Preempted);
        // Restart was set by the operation; the pipeline leaves it for
        // the re-execution.
        assert_eq!(ctx.thread.state, ThreadState::Restart);
        assert_eq!(ctx.regs.msg_info_reg(), request);
    }
}
