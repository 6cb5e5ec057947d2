//! The V6 stack-machine instruction set, base of every HE revision.

use super::*;
use crate::decompiler::BinOp::*;

const fn ops(table: &'static [OpcodeDef]) -> OperandRule {
    OperandRule::Sub { mask: 0xFF, table }
}

const fn ops_code(opcode: u8, name: &'static str, table: &'static [OpcodeDef]) -> OpcodeDef {
    op(opcode, name, ops(table), Handler::Ops)
}

const CURSOR_OPS: &[OpcodeDef] = &[
    op(0x90, "cursorOn", NONE, call(&[])),
    op(0x91, "cursorOff", NONE, call(&[])),
    op(0x92, "userputOn", NONE, call(&[])),
    op(0x93, "userputOff", NONE, call(&[])),
    op(0x94, "softCursorOn", NONE, call(&[])),
    op(0x95, "softCursorOff", NONE, call(&[])),
    op(0x96, "softUserputOn", NONE, call(&[])),
    op(0x97, "softUserputOff", NONE, call(&[])),
    op(0x99, "setCursorImg", NONE, call(&[OBJECT, V])),
    op(0x9A, "setCursorHotspot", NONE, call(&[V, V])),
    op(0x9C, "initCharset", NONE, call(&[CHARSET])),
    op(0x9D, "charsetColors", NONE, call(&[LIST])),
    op(0xD6, "setCursorTransparentColor", NONE, call(&[V])),
];

const RESOURCE_OPS: &[OpcodeDef] = &[
    op(0x64, "loadScript", NONE, call(&[SCRIPT])),
    op(0x65, "loadSound", NONE, call(&[SOUND])),
    op(0x66, "loadCostume", NONE, call(&[COSTUME])),
    op(0x67, "loadRoom", NONE, call(&[ROOM])),
    op(0x68, "nukeScript", NONE, call(&[SCRIPT])),
    op(0x69, "nukeSound", NONE, call(&[SOUND])),
    op(0x6A, "nukeCostume", NONE, call(&[COSTUME])),
    op(0x6B, "nukeRoom", NONE, call(&[ROOM])),
    op(0x6C, "lockScript", NONE, call(&[SCRIPT])),
    op(0x6D, "lockSound", NONE, call(&[SOUND])),
    op(0x6E, "lockCostume", NONE, call(&[COSTUME])),
    op(0x6F, "lockRoom", NONE, call(&[ROOM])),
    op(0x70, "unlockScript", NONE, call(&[SCRIPT])),
    op(0x71, "unlockSound", NONE, call(&[SOUND])),
    op(0x72, "unlockCostume", NONE, call(&[COSTUME])),
    op(0x73, "unlockRoom", NONE, call(&[ROOM])),
    op(0x75, "loadCharset", NONE, call(&[CHARSET])),
    op(0x76, "nukeCharset", NONE, call(&[CHARSET])),
    op(0x77, "loadFlObject", NONE, call(&[OBJECT, ROOM])),
];

const ROOM_OPS: &[OpcodeDef] = &[
    op(0xAC, "roomScroll", NONE, call(&[V, V])),
    op(0xAE, "setScreen", NONE, call(&[V, V])),
    op(0xAF, "setPalColor", NONE, call(&[V, V, V, V])),
    op(0xB0, "shakeOn", NONE, call(&[])),
    op(0xB1, "shakeOff", NONE, call(&[])),
    op(0xB3, "darkenPalette", NONE, call(&[V, V, V])),
    op(0xB4, "saveLoadRoom", NONE, call(&[V, V])),
    op(0xB5, "screenEffect", NONE, call(&[V])),
    op(0xB6, "darkenPaletteRGB", NONE, call(&[V, V, V, V, V])),
    op(0xB7, "setupShadowPalette", NONE, call(&[V, V, V, V, V])),
    op(0xBA, "palManipulate", NONE, call(&[V, V, V, V])),
    op(0xBB, "colorCycleDelay", NONE, call(&[V, V])),
    op(0xD5, "setPalette", NONE, call(&[V])),
    op(0xDC, "copyPalColor", NONE, call(&[V, V])),
];

const ACTOR_OPS: &[OpcodeDef] = &[
    op(0x4C, "setCostume", NONE, call(&[COSTUME])),
    op(0x4D, "setWalkSpeed", NONE, call(&[V, V])),
    op(0x4E, "setSound", NONE, call(&[LIST])),
    op(0x4F, "setWalkFrame", NONE, call(&[V])),
    op(0x50, "setTalkFrame", NONE, call(&[V, V])),
    op(0x51, "setStandFrame", NONE, call(&[V])),
    op(0x53, "init", NONE, call(&[])),
    op(0x54, "setElevation", NONE, call(&[V])),
    op(0x55, "setDefAnim", NONE, call(&[])),
    op(0x56, "setPalette", NONE, call(&[V, V])),
    op(0x57, "setTalkColor", NONE, call(&[V])),
    op(0x58, "setName", STR, call(&[])),
    op(0x59, "setInitFrame", NONE, call(&[V])),
    op(0x5B, "setWidth", NONE, call(&[V])),
    op(0x5C, "setScale", NONE, call(&[V])),
    op(0x5D, "setNeverZClip", NONE, call(&[])),
    op(0x5E, "setAlwaysZClip", NONE, call(&[V])),
    op(0x5F, "setIgnoreBoxes", NONE, call(&[])),
    op(0x60, "setFollowBoxes", NONE, call(&[])),
    op(0x61, "setAnimSpeed", NONE, call(&[V])),
    op(0x62, "setShadowMode", NONE, call(&[V])),
    op(0x63, "setTalkPos", NONE, call(&[V, V])),
    op(0xC5, "setCurActor", NONE, call(&[ACTOR])),
    op(0xC6, "setAnimVar", NONE, call(&[V, V])),
    op(0xD7, "setIgnoreTurnsOn", NONE, call(&[])),
    op(0xD8, "setIgnoreTurnsOff", NONE, call(&[])),
    op(0xD9, "reinit", NONE, call(&[])),
];

const VERB_OPS: &[OpcodeDef] = &[
    op(0x7C, "setImage", NONE, call(&[OBJECT])),
    op(0x7D, "setName", STR, call(&[])),
    op(0x7E, "setColor", NONE, call(&[V])),
    op(0x7F, "setHiColor", NONE, call(&[V])),
    op(0x80, "setXY", NONE, call(&[V, V])),
    op(0x81, "setOn", NONE, call(&[])),
    op(0x82, "setOff", NONE, call(&[])),
    op(0x83, "kill", NONE, call(&[])),
    op(0x84, "init", NONE, call(&[])),
    op(0x85, "setDimColor", NONE, call(&[V])),
    op(0x86, "setDimmed", NONE, call(&[])),
    op(0x87, "setKey", NONE, call(&[V])),
    op(0x88, "setCenter", NONE, call(&[])),
    op(0x89, "setToString", NONE, call(&[V])),
    op(0x8B, "setToObject", NONE, call(&[OBJECT, V])),
    op(0x8C, "setBkColor", NONE, call(&[V])),
    op(0xC4, "setCurVerb", NONE, call(&[VERB])),
    op(0xFF, "redraw", NONE, call(&[])),
];

const ARRAY_OPS: &[OpcodeDef] = &[
    op(0xCD, "assignString", OperandRule::Seq(&[WV, STR]), call(&[V])),
    op(0xD0, "assignList", WV, call(&[LIST, V])),
    op(0xD4, "assign2dimList", WV, call(&[V, LIST, V])),
];

const SAVE_RESTORE_OPS: &[OpcodeDef] = &[
    op(0x8D, "saveVerbs", NONE, call(&[V, V, V])),
    op(0x8E, "restoreVerbs", NONE, call(&[V, V, V])),
    op(0x8F, "deleteVerbs", NONE, call(&[V, V, V])),
];

// The jump operand of the actor waits re-enters the instruction while the condition holds.
const WAIT_OPS: &[OpcodeDef] = &[
    op(0xA8, "forActor", JMP, call(&[ACTOR])),
    op(0xA9, "forMessage", NONE, call(&[])),
    op(0xAA, "forCamera", NONE, call(&[])),
    op(0xAB, "forSentence", NONE, call(&[])),
    op(0xE2, "untilActorDrawn", JMP, call(&[ACTOR])),
    op(0xE8, "untilActorTurned", JMP, call(&[ACTOR])),
];

const SYSTEM_OPS: &[OpcodeDef] = &[
    op(0x9E, "restartGame", NONE, call(&[])),
    op(0x9F, "pauseGame", NONE, call(&[])),
    op(0xA0, "shutDown", NONE, call(&[])),
];

const PRINT_OPS: &[OpcodeDef] = &[
    op(0x41, "XY", NONE, call(&[V, V])),
    op(0x42, "color", NONE, call(&[V])),
    op(0x43, "right", NONE, call(&[V])),
    op(0x45, "center", NONE, call(&[])),
    op(0x47, "left", NONE, call(&[])),
    op(0x48, "overhead", NONE, call(&[])),
    op(0x4A, "mumble", NONE, call(&[])),
    op(0x4B, "msg", STR, call(&[])),
    op(0xFE, "begin", NONE, call(&[])),
    op(0xFF, "end", NONE, call(&[])),
];

const PRINT_ACTOR_OPS: &[OpcodeDef] = &[
    op(0x41, "XY", NONE, call(&[V, V])),
    op(0x42, "color", NONE, call(&[V])),
    op(0x43, "right", NONE, call(&[V])),
    op(0x45, "center", NONE, call(&[])),
    op(0x47, "left", NONE, call(&[])),
    op(0x48, "overhead", NONE, call(&[])),
    op(0x4A, "mumble", NONE, call(&[])),
    op(0x4B, "msg", STR, call(&[])),
    op(0xFE, "begin", NONE, call(&[ACTOR])),
    op(0xFF, "end", NONE, call(&[])),
];

const DIM_OPS: &[OpcodeDef] = &[
    op(0xC7, "int", WV, call(&[V])),
    op(0xC8, "bit", WV, call(&[V])),
    op(0xC9, "nibble", WV, call(&[V])),
    op(0xCA, "byte", WV, call(&[V])),
    op(0xCB, "string", WV, call(&[V])),
    op(0xCC, "nuke", WV, call(&[])),
];

const DIM2_OPS: &[OpcodeDef] = &[
    op(0xC7, "int", WV, call(&[V, V])),
    op(0xC8, "bit", WV, call(&[V, V])),
    op(0xC9, "nibble", WV, call(&[V, V])),
    op(0xCA, "byte", WV, call(&[V, V])),
    op(0xCB, "string", WV, call(&[V, V])),
];

pub(super) static V6: Overlay = Overlay {
    parent: None,
    removed: &[],
    entries: &[
        op(0x00, "pushByte", B, Handler::PushConst),
        op(0x01, "pushWord", W, Handler::PushConst),
        op(0x02, "pushByteVar", BV, Handler::PushVar),
        op(0x03, "pushWordVar", WV, Handler::PushVar),
        op(0x06, "byteArrayRead", BV, Handler::ArrayRead { dims: 1 }),
        op(0x07, "wordArrayRead", WV, Handler::ArrayRead { dims: 1 }),
        op(0x0A, "byteArrayIndexedRead", BV, Handler::ArrayRead { dims: 2 }),
        op(0x0B, "wordArrayIndexedRead", WV, Handler::ArrayRead { dims: 2 }),
        op(0x0C, "dup", NONE, Handler::Dup),
        op(0x0D, "not", NONE, Handler::Not),
        op(0x0E, "eq", NONE, bin(Eq)),
        op(0x0F, "neq", NONE, bin(Ne)),
        op(0x10, "gt", NONE, bin(Gt)),
        op(0x11, "lt", NONE, bin(Lt)),
        op(0x12, "le", NONE, bin(Le)),
        op(0x13, "ge", NONE, bin(Ge)),
        op(0x14, "add", NONE, bin(Add)),
        op(0x15, "sub", NONE, bin(Sub)),
        op(0x16, "mul", NONE, bin(Mul)),
        op(0x17, "div", NONE, bin(Div)),
        op(0x18, "land", NONE, bin(LAnd)),
        op(0x19, "lor", NONE, bin(LOr)),
        op(0x1A, "pop", NONE, Handler::Pop),
        op(0x42, "writeByteVar", BV, Handler::Assign),
        op(0x43, "writeWordVar", WV, Handler::Assign),
        op(0x46, "byteArrayWrite", BV, Handler::ArrayWrite { dims: 1 }),
        op(0x47, "wordArrayWrite", WV, Handler::ArrayWrite { dims: 1 }),
        op(0x4A, "byteArrayIndexedWrite", BV, Handler::ArrayWrite { dims: 2 }),
        op(0x4B, "wordArrayIndexedWrite", WV, Handler::ArrayWrite { dims: 2 }),
        op(0x4E, "byteVarInc", BV, Handler::Step { increment: true }),
        op(0x4F, "wordVarInc", WV, Handler::Step { increment: true }),
        op(0x52, "byteArrayInc", BV, Handler::ArrayStep { increment: true }),
        op(0x53, "wordArrayInc", WV, Handler::ArrayStep { increment: true }),
        op(0x56, "byteVarDec", BV, Handler::Step { increment: false }),
        op(0x57, "wordVarDec", WV, Handler::Step { increment: false }),
        op(0x5A, "byteArrayDec", BV, Handler::ArrayStep { increment: false }),
        op(0x5B, "wordArrayDec", WV, Handler::ArrayStep { increment: false }),
        op(0x5C, "if", JMP, Handler::JumpIf { when: true }),
        op(0x5D, "ifNot", JMP, Handler::JumpIf { when: false }),
        op(0x5E, "startScript", NONE, call(&[V, SCRIPT, LIST])),
        op(0x5F, "startScriptQuick", NONE, call(&[SCRIPT, LIST])),
        op(0x60, "startObject", NONE, call(&[V, OBJECT, V, LIST])),
        op(0x61, "drawObject", NONE, call(&[OBJECT, V])),
        op(0x62, "drawObjectAt", NONE, call(&[OBJECT, V, V])),
        op(0x63, "drawBlastObject", NONE, call(&[OBJECT, V, V, V, V, LIST])),
        op(0x64, "setBlastObjectWindow", NONE, call(&[V, V, V, V])),
        op(0x65, "stopObjectCodeA", NONE, call(&[])),
        op(0x66, "stopObjectCodeB", NONE, call(&[])),
        op(0x67, "endCutscene", NONE, call(&[])),
        op(0x68, "beginCutscene", NONE, call(&[LIST])),
        op(0x69, "stopMusic", NONE, call(&[])),
        op(0x6A, "freezeUnfreeze", NONE, call(&[V])),
        ops_code(0x6B, "cursorCommand", CURSOR_OPS),
        op(0x6C, "breakHere", NONE, Handler::Yield),
        op(0x6D, "ifClassOfIs", NONE, func(&[OBJECT, LIST])),
        op(0x6E, "setClass", NONE, call(&[OBJECT, LIST])),
        op(0x6F, "getState", NONE, func(&[OBJECT])),
        op(0x70, "setState", NONE, call(&[OBJECT, V])),
        op(0x71, "setOwner", NONE, call(&[OBJECT, ACTOR])),
        op(0x72, "getOwner", NONE, func(&[OBJECT])),
        op(0x73, "jump", JMP, Handler::Jump),
        op(0x74, "startSound", NONE, call(&[SOUND])),
        op(0x75, "stopSound", NONE, call(&[SOUND])),
        op(0x76, "startMusic", NONE, call(&[SOUND])),
        op(0x77, "stopObjectScript", NONE, call(&[SCRIPT])),
        op(0x78, "panCameraTo", NONE, call(&[V])),
        op(0x79, "actorFollowCamera", NONE, call(&[ACTOR])),
        op(0x7A, "setCameraAt", NONE, call(&[V])),
        op(0x7B, "loadRoom", NONE, call(&[ROOM])),
        op(0x7C, "stopScript", NONE, call(&[SCRIPT])),
        op(0x7D, "walkActorToObj", NONE, call(&[ACTOR, OBJECT, V])),
        op(0x7E, "walkActorTo", NONE, call(&[ACTOR, V, V])),
        op(0x7F, "putActorAtXY", NONE, call(&[ACTOR, V, V, ROOM])),
        op(0x80, "putActorAtObject", NONE, call(&[ACTOR, OBJECT])),
        op(0x81, "faceActor", NONE, call(&[ACTOR, V])),
        op(0x82, "animateActor", NONE, call(&[ACTOR, V])),
        op(0x83, "doSentence", NONE, call(&[VERB, OBJECT, V, OBJECT])),
        op(0x84, "pickupObject", NONE, call(&[OBJECT, ROOM])),
        op(0x85, "loadRoomWithEgo", NONE, call(&[OBJECT, ROOM, V, V])),
        op(0x87, "getRandomNumber", NONE, func(&[V])),
        op(0x88, "getRandomNumberRange", NONE, func(&[V, V])),
        op(0x8A, "getActorMoving", NONE, func(&[ACTOR])),
        op(0x8B, "isScriptRunning", NONE, func(&[SCRIPT])),
        op(0x8C, "getActorRoom", NONE, func(&[ACTOR])),
        op(0x8D, "getObjectX", NONE, func(&[OBJECT])),
        op(0x8E, "getObjectY", NONE, func(&[OBJECT])),
        op(0x8F, "getObjectOldDir", NONE, func(&[OBJECT])),
        op(0x90, "getActorWalkBox", NONE, func(&[ACTOR])),
        op(0x91, "getActorCostume", NONE, func(&[ACTOR])),
        op(0x92, "findInventory", NONE, func(&[ACTOR, V])),
        op(0x93, "getInventoryCount", NONE, func(&[ACTOR])),
        op(0x94, "getVerbFromXY", NONE, func(&[V, V])),
        op(0x95, "beginOverride", NONE, call(&[])),
        op(0x96, "endOverride", NONE, call(&[])),
        op(0x97, "setObjectName", STR, call(&[OBJECT])),
        op(0x98, "isSoundRunning", NONE, func(&[SOUND])),
        op(0x99, "setBoxFlags", NONE, call(&[LIST, V])),
        op(0x9A, "createBoxMatrix", NONE, call(&[])),
        ops_code(0x9B, "resourceRoutines", RESOURCE_OPS),
        ops_code(0x9C, "roomOps", ROOM_OPS),
        ops_code(0x9D, "actorOps", ACTOR_OPS),
        ops_code(0x9E, "verbOps", VERB_OPS),
        op(0x9F, "getActorFromXY", NONE, func(&[V, V])),
        op(0xA0, "findObject", NONE, func(&[V, V])),
        op(0xA1, "pseudoRoom", NONE, call(&[V, LIST])),
        op(0xA2, "getActorElevation", NONE, func(&[ACTOR])),
        op(0xA3, "getVerbEntrypoint", NONE, func(&[OBJECT, VERB])),
        ops_code(0xA4, "arrayOps", ARRAY_OPS),
        ops_code(0xA5, "saveRestoreVerbs", SAVE_RESTORE_OPS),
        op(0xA6, "drawBox", NONE, call(&[V, V, V, V, V])),
        op(0xA8, "getActorWidth", NONE, func(&[ACTOR])),
        ops_code(0xA9, "wait", WAIT_OPS),
        op(0xAA, "getActorScaleX", NONE, func(&[ACTOR])),
        op(0xAB, "getActorAnimCounter", NONE, func(&[ACTOR])),
        op(0xAC, "soundKludge", NONE, call(&[LIST])),
        op(0xAD, "isAnyOf", NONE, func(&[V, LIST])),
        ops_code(0xAE, "systemOps", SYSTEM_OPS),
        op(0xAF, "isActorInBox", NONE, func(&[ACTOR, V])),
        op(0xB0, "delay", NONE, call(&[V])),
        op(0xB1, "delaySeconds", NONE, call(&[V])),
        op(0xB2, "delayMinutes", NONE, call(&[V])),
        op(0xB3, "stopSentence", NONE, call(&[])),
        ops_code(0xB4, "printLine", PRINT_OPS),
        ops_code(0xB5, "printText", PRINT_OPS),
        ops_code(0xB6, "printDebug", PRINT_OPS),
        ops_code(0xB7, "printSystem", PRINT_OPS),
        ops_code(0xB8, "printActor", PRINT_ACTOR_OPS),
        ops_code(0xB9, "printEgo", PRINT_OPS),
        op(0xBA, "talkActor", STR, call(&[ACTOR])),
        op(0xBB, "talkEgo", STR, call(&[])),
        ops_code(0xBC, "dimArray", DIM_OPS),
        op(0xBE, "startObjectQuick", NONE, call(&[OBJECT, V, LIST])),
        op(0xBF, "startScriptQuick2", NONE, call(&[SCRIPT, LIST])),
        ops_code(0xC0, "dim2dimArray", DIM2_OPS),
        op(0xC4, "abs", NONE, func(&[V])),
        op(0xC5, "distObjectObject", NONE, func(&[OBJECT, OBJECT])),
        op(0xC6, "distObjectPt", NONE, func(&[OBJECT, V, V])),
        op(0xC7, "distPtPt", NONE, func(&[V, V, V, V])),
        op(0xC8, "kernelGetFunctions", NONE, func(&[LIST])),
        op(0xC9, "kernelSetFunctions", NONE, call(&[LIST])),
        op(0xCA, "delayFrames", NONE, call(&[V])),
        op(0xCB, "pickOneOf", NONE, func(&[V, LIST])),
        op(0xCC, "pickOneOfDefault", NONE, func(&[V, LIST, V])),
        op(0xCD, "stampObject", NONE, call(&[OBJECT, V, V, V])),
        op(0xD0, "getDateTime", NONE, call(&[])),
        op(0xD1, "stopTalking", NONE, call(&[])),
        op(0xD2, "getAnimateVariable", NONE, func(&[ACTOR, V])),
        op(0xD4, "shuffle", WV, call(&[V, V])),
        op(0xD5, "jumpToScript", NONE, call(&[SCRIPT, LIST])),
        op(0xD6, "band", NONE, bin(BAnd)),
        op(0xD7, "bor", NONE, bin(BOr)),
        op(0xD8, "isRoomScriptRunning", NONE, func(&[SCRIPT])),
        op(0xDD, "findAllObjects", NONE, func(&[ROOM])),
        op(0xE1, "getPixel", NONE, func(&[V, V])),
        op(0xE3, "pickVarRandom", WV, func(&[LIST])),
        op(0xE4, "setBoxSet", NONE, call(&[V])),
        op(0xEC, "getActorLayer", NONE, func(&[ACTOR])),
        op(0xED, "getObjectNewDir", NONE, func(&[OBJECT])),
    ],
};
